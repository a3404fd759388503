//! Correlation analysis.
//!
//! Provides [`spearman_correlation`] for paired survey answers and the
//! [`pearson`] coefficient it is built on.

use panel_core::Scored;

use crate::rank::average_ranks;
use crate::sample::{valid_pairs, Observation};

/// Minimum number of complete pairs for a Spearman coefficient.
pub const MIN_PAIRS: usize = 3;

/// Spearman rank correlation with the number of pairs it used.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpearmanResult {
    /// Rank correlation coefficient in [-1, 1].
    pub rho: f64,
    /// Complete pairs after filtering.
    pub n: usize,
}

impl Scored for SpearmanResult {
    fn score(&self) -> f64 {
        self.rho
    }
}

/// Pearson product-moment correlation between equal-length clean slices.
///
/// Only the common prefix is used if lengths differ. Returns 0.0 if either
/// series is constant or empty.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n == 0 {
        return 0.0;
    }
    let (x, y) = (&x[..n], &y[..n]);
    let n_f = n as f64;
    let mean_x: f64 = x.iter().sum::<f64>() / n_f;
    let mean_y: f64 = y.iter().sum::<f64>() / n_f;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom > 0.0 {
        cov / denom
    } else {
        0.0
    }
}

/// Spearman rank correlation coefficient between `x` and `y`.
///
/// Pairs are formed by index over the overlapping range and kept only when
/// both sides are valid. With fewer than [`MIN_PAIRS`] pairs the result is
/// `rho = 0`. Otherwise both sides are ranked with tie averaging and the
/// Pearson correlation of the ranks is returned.
///
/// ```
/// use panel_stats::correlation::spearman_correlation;
///
/// let r = spearman_correlation(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]);
/// assert_eq!(r.n, 3);
/// assert!((r.rho + 1.0).abs() < 1e-12);
/// ```
pub fn spearman_correlation<X: Observation, Y: Observation>(x: &[X], y: &[Y]) -> SpearmanResult {
    let (xs, ys) = valid_pairs(x, y);
    let n = xs.len();
    if n < MIN_PAIRS {
        return SpearmanResult { rho: 0.0, n };
    }
    let rx = average_ranks(&xs);
    let ry = average_ranks(&ys);
    SpearmanResult {
        rho: pearson(&rx, &ry),
        n,
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-10;

    #[test]
    fn pearson_perfect() {
        assert!((pearson(&[1.0, 2.0, 3.0, 4.0], &[2.0, 4.0, 6.0, 8.0]) - 1.0).abs() < TOL);
        assert!((pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]) + 1.0).abs() < TOL);
    }

    #[test]
    fn pearson_constant_is_zero() {
        assert_eq!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(pearson(&[], &[]), 0.0);
    }

    #[test]
    fn spearman_identity_and_reverse() {
        let r = spearman_correlation(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
        assert!((r.rho - 1.0).abs() < TOL);
        assert_eq!(r.n, 3);
        let r = spearman_correlation(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]);
        assert!((r.rho + 1.0).abs() < TOL);
    }

    #[test]
    fn spearman_monotone_nonlinear() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [1.0, 8.0, 27.0, 64.0, 125.0];
        assert!((spearman_correlation(&x, &y).rho - 1.0).abs() < TOL);
    }

    #[test]
    fn spearman_too_few_pairs() {
        let r = spearman_correlation(&[1.0, 2.0, f64::NAN], &[1.0, 2.0, 3.0]);
        assert_eq!(r, SpearmanResult { rho: 0.0, n: 2 });
    }

    #[test]
    fn spearman_uses_overlap_only() {
        let x = [Some(1.0), None, Some(2.0), Some(3.0), Some(4.0), Some(100.0)];
        let y = [10.0, 20.0, 30.0, 40.0, 50.0];
        // pairs: (1,10), (2,30), (3,40), (4,50)
        let r = spearman_correlation(&x, &y);
        assert_eq!(r.n, 4);
        assert!((r.rho - 1.0).abs() < TOL);
    }

    #[test]
    fn spearman_with_ties() {
        // ranks x: 1.5, 1.5, 3, 4 ; y: 1, 2, 3, 4
        let r = spearman_correlation(&[1.0, 1.0, 2.0, 3.0], &[1.0, 2.0, 3.0, 4.0]);
        let expected = pearson(&[1.5, 1.5, 3.0, 4.0], &[1.0, 2.0, 3.0, 4.0]);
        assert!((r.rho - expected).abs() < TOL);
        assert!(r.rho < 1.0 && r.rho > 0.9);
    }
}
