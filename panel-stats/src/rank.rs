//! Rank transformation with tie averaging.
//!
//! [`average_ranks`] is the single ranking primitive shared by the
//! Mann-Whitney test and Spearman correlation. Tied values share the mean of
//! the 1-based positions their run occupies in sorted order.

/// Rank `data` in ascending order, giving tied values their average rank.
///
/// Returns a `Vec<f64>` of the same length as `data`, where each element is
/// the 1-based rank of the corresponding input value. A tied run occupying
/// sorted positions `i..j` (0-based, `j` exclusive) gets `(i + 1 + j) / 2`.
///
/// Empty input produces empty output.
pub fn average_ranks(data: &[f64]) -> Vec<f64> {
    let n = data.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| data[a].total_cmp(&data[b]));

    let mut ranks = vec![0.0; n];
    for_each_tie_run(&order, data, |run, rank| {
        for &idx in run {
            ranks[idx] = rank;
        }
    });
    ranks
}

/// Sizes of every tied run (length > 1) in `data`.
///
/// Used for the tie-corrected Mann-Whitney variance.
pub fn tie_run_lengths(data: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..data.len()).collect();
    order.sort_by(|&a, &b| data[a].total_cmp(&data[b]));

    let mut runs = Vec::new();
    for_each_tie_run(&order, data, |run, _| {
        if run.len() > 1 {
            runs.push(run.len());
        }
    });
    runs
}

/// Walk `order` (indices into `data`, sorted by value) run by run, calling
/// `f` with the indices of each run of equal values and their shared rank.
fn for_each_tie_run(order: &[usize], data: &[f64], mut f: impl FnMut(&[usize], f64)) {
    let n = order.len();
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && data[order[j]] == data[order[i]] {
            j += 1;
        }
        f(&order[i..j], (i + 1 + j) as f64 / 2.0);
        i = j;
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_ties() {
        assert_eq!(average_ranks(&[3.0, 1.0, 2.0]), vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn pair_tie() {
        // sorted: 1(1), 2(2), 2(3), 3(4) → ties at 2 get (2+3)/2 = 2.5
        assert_eq!(average_ranks(&[3.0, 1.0, 2.0, 2.0]), vec![4.0, 1.0, 2.5, 2.5]);
    }

    #[test]
    fn four_way_tie_at_bottom() {
        // merged [1,1,2] ++ [1,1,3]: the four 1's span positions 1-4
        let r = average_ranks(&[1.0, 1.0, 2.0, 1.0, 1.0, 3.0]);
        assert_eq!(r, vec![2.5, 2.5, 5.0, 2.5, 2.5, 6.0]);
    }

    #[test]
    fn all_equal() {
        assert_eq!(average_ranks(&[5.0, 5.0, 5.0]), vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn negative_zero_ties_with_zero() {
        assert_eq!(average_ranks(&[0.0, -0.0]), vec![1.5, 1.5]);
    }

    #[test]
    fn empty() {
        assert!(average_ranks(&[]).is_empty());
        assert!(tie_run_lengths(&[]).is_empty());
    }

    #[test]
    fn tie_runs() {
        let mut runs = tie_run_lengths(&[1.0, 2.0, 1.0, 3.0, 2.0, 2.0, 4.0]);
        runs.sort_unstable();
        assert_eq!(runs, vec![2, 3]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn rank_sum_is_triangular(data in proptest::collection::vec(0u8..10, 0..60)) {
            let data: Vec<f64> = data.into_iter().map(f64::from).collect();
            let n = data.len() as f64;
            let sum: f64 = average_ranks(&data).iter().sum();
            prop_assert!((sum - n * (n + 1.0) / 2.0).abs() < 1e-9);
        }

        #[test]
        fn ranks_preserve_order(data in proptest::collection::vec(-100.0f64..100.0, 1..40)) {
            let r = average_ranks(&data);
            for i in 0..data.len() {
                for j in 0..data.len() {
                    if data[i] < data[j] {
                        prop_assert!(r[i] < r[j]);
                    }
                }
            }
        }
    }
}
