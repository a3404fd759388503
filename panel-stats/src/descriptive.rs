//! Descriptive statistics for survey samples.
//!
//! Provides individual functions ([`mean`], [`median`], [`variance`],
//! [`percentile`]) and the aggregate [`describe`] that fills a
//! [`DescriptiveStats`]. Every function filters missing values first and
//! degrades to zero on empty input instead of failing.

use panel_core::Summarizable;

use crate::sample::{valid, Observation};

/// Aggregate descriptive statistics for one sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DescriptiveStats {
    /// Number of valid observations.
    pub n: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Median (50th percentile).
    pub median: f64,
    /// Sample standard deviation (n-1 denominator), 0 when n < 2.
    pub sd: f64,
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
    /// First quartile (25th percentile).
    pub q1: f64,
    /// Third quartile (75th percentile).
    pub q3: f64,
    /// Interquartile range (q3 - q1).
    pub iqr: f64,
}

impl Summarizable for DescriptiveStats {
    fn summary(&self) -> String {
        format!(
            "n={}, mean={:.4}, sd={:.4}, median={:.4}, iqr={:.4}",
            self.n, self.mean, self.sd, self.median, self.iqr,
        )
    }
}

/// Compute all descriptive statistics for `data`.
///
/// Empty or all-missing input yields `DescriptiveStats::default()` (n = 0,
/// every field 0).
///
/// ```
/// use panel_stats::descriptive::describe;
///
/// let stats = describe(&[7.0, 8.0, 6.0, 9.0, 7.0]);
/// assert_eq!(stats.n, 5);
/// assert!((stats.mean - 7.4).abs() < 1e-12);
/// assert_eq!(stats.median, 7.0);
/// ```
pub fn describe<T: Observation>(data: &[T]) -> DescriptiveStats {
    let mut sorted = valid(data);
    if sorted.is_empty() {
        return DescriptiveStats::default();
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let q1 = percentile_sorted(&sorted, 25.0);
    let q3 = percentile_sorted(&sorted, 75.0);

    DescriptiveStats {
        n: sorted.len(),
        mean: mean_of(&sorted),
        median: median_sorted(&sorted),
        sd: variance_of(&sorted).sqrt(),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        q1,
        q3,
        iqr: q3 - q1,
    }
}

// ── Individual functions ───────────────────────────────────────────────────

/// Arithmetic mean, 0 for empty input.
pub fn mean<T: Observation>(data: &[T]) -> f64 {
    mean_of(&valid(data))
}

/// Median, averaging the two middle values for even n. 0 for empty input.
pub fn median<T: Observation>(data: &[T]) -> f64 {
    let mut sorted = valid(data);
    sorted.sort_by(|a, b| a.total_cmp(b));
    median_sorted(&sorted)
}

/// Sample variance (n-1 denominator). Returns 0 when fewer than two values.
pub fn variance<T: Observation>(data: &[T]) -> f64 {
    variance_of(&valid(data))
}

/// Sample standard deviation, the square root of [`variance`].
pub fn std_dev<T: Observation>(data: &[T]) -> f64 {
    variance(data).sqrt()
}

/// Percentile `p` (0-100) by linear interpolation between order statistics.
///
/// Sorts a private copy, so the caller's slice is left untouched. The rank
/// is `p / 100 * (n - 1)`; `p = 0` gives the minimum, `p = 100` the maximum,
/// and out-of-range `p` is clamped. 0 for empty input.
pub fn percentile<T: Observation>(data: &[T], p: f64) -> f64 {
    let mut sorted = valid(data);
    sorted.sort_by(|a, b| a.total_cmp(b));
    percentile_sorted(&sorted, p)
}

// ── Internal ───────────────────────────────────────────────────────────────

/// Mean of an already-filtered slice.
pub(crate) fn mean_of(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance of an already-filtered slice.
pub(crate) fn variance_of(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean_of(values);
    values.iter().map(|&x| (x - m).powi(2)).sum::<f64>() / (n - 1) as f64
}

fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    let mid = n / 2;
    if n % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    let p = if p.is_nan() { 50.0 } else { p.clamp(0.0, 100.0) };
    let rank = p / 100.0 * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if hi >= n {
        return sorted[n - 1];
    }
    let frac = rank - lo as f64;
    sorted[lo] * (1.0 - frac) + sorted[hi] * frac
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-10;

    #[test]
    fn describe_empty() {
        let empty: [f64; 0] = [];
        assert_eq!(describe(&empty), DescriptiveStats::default());
        assert_eq!(describe(&[f64::NAN, f64::NAN]).n, 0);
        assert_eq!(describe(&[None::<f64>]).mean, 0.0);
    }

    #[test]
    fn describe_single() {
        let stats = describe(&[5.0]);
        assert_eq!(stats.n, 1);
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.median, 5.0);
        assert_eq!(stats.min, 5.0);
        assert_eq!(stats.max, 5.0);
        assert_eq!(stats.sd, 0.0);
        assert_eq!(stats.iqr, 0.0);
    }

    #[test]
    fn describe_known_data() {
        let stats = describe(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(stats.n, 5);
        assert!((stats.mean - 3.0).abs() < TOL);
        assert!((stats.median - 3.0).abs() < TOL);
        assert!((stats.sd - 2.5f64.sqrt()).abs() < TOL);
        assert!((stats.q1 - 2.0).abs() < TOL);
        assert!((stats.q3 - 4.0).abs() < TOL);
        assert!((stats.iqr - 2.0).abs() < TOL);
    }

    #[test]
    fn describe_skips_missing() {
        let stats = describe(&[Some(2.0), None, Some(4.0), Some(f64::NAN)]);
        assert_eq!(stats.n, 2);
        assert!((stats.mean - 3.0).abs() < TOL);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 4.0);
    }

    #[test]
    fn median_even() {
        assert!((median(&[4.0, 1.0, 3.0, 2.0]) - 2.5).abs() < TOL);
    }

    #[test]
    fn variance_too_few() {
        assert_eq!(variance(&[1.0]), 0.0);
        assert_eq!(variance::<f64>(&[]), 0.0);
    }

    #[test]
    fn variance_sample() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((variance(&data) - 32.0 / 7.0).abs() < TOL);
    }

    #[test]
    fn percentile_bounds_and_interpolation() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        assert_eq!(percentile(&data, 0.0), 1.0);
        assert_eq!(percentile(&data, 100.0), 8.0);
        assert!((percentile(&data, 25.0) - 2.75).abs() < TOL);
        assert!((percentile(&data, 75.0) - 6.25).abs() < TOL);
        assert_eq!(percentile(&data, 150.0), 8.0);
        assert_eq!(percentile(&data, -5.0), 1.0);
    }

    #[test]
    fn percentile_leaves_input_unsorted() {
        let data = vec![3.0, 1.0, 2.0];
        let _ = percentile(&data, 50.0);
        assert_eq!(data, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn summarizable_impl() {
        let s = describe(&[1.0, 2.0, 3.0]).summary();
        assert!(s.contains("n=3"));
        assert!(s.contains("mean=2.0000"));
    }
}
