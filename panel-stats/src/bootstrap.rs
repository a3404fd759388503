//! Percentile-bootstrap confidence interval for a difference in means.
//!
//! The random source is always supplied by the caller: pass any
//! [`rand::Rng`], or use [`bootstrap_mean_difference_ci_seeded`] to get a
//! locally scoped, reproducible [`StdRng`]. Nothing here touches a global
//! generator.

use panel_core::{PanelError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::descriptive::{mean_of, variance_of};
use crate::sample::{valid, Observation};

/// Default number of bootstrap resamples.
pub const DEFAULT_RESAMPLES: usize = 2000;

/// Default two-sided significance level (95% interval).
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Resampling configuration for [`bootstrap_mean_difference_ci`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct BootstrapConfig {
    /// Number of resample pairs to draw.
    pub n_bootstrap: usize,
    /// Two-sided significance level; the interval covers `1 - alpha`.
    pub alpha: f64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            n_bootstrap: DEFAULT_RESAMPLES,
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl BootstrapConfig {
    /// Create a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `n_bootstrap` is zero or `alpha` is not in `(0, 1)`.
    pub fn new(n_bootstrap: usize, alpha: f64) -> Result<Self> {
        let config = Self { n_bootstrap, alpha };
        config.validate()?;
        Ok(config)
    }

    /// Check a configuration built field by field (e.g. deserialized).
    pub fn validate(&self) -> Result<()> {
        if self.n_bootstrap == 0 {
            return Err(PanelError::InvalidInput(
                "bootstrap: n_bootstrap must be > 0".into(),
            ));
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(PanelError::InvalidInput(format!(
                "bootstrap: alpha must be in (0, 1), got {}",
                self.alpha
            )));
        }
        Ok(())
    }
}

/// Bootstrap estimate of a mean difference with its percentile interval.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BootstrapCIResult {
    /// Observed `mean(A) - mean(B)` (not the bootstrap mean).
    pub estimate: f64,
    /// Lower percentile bound.
    pub ci_lower: f64,
    /// Upper percentile bound.
    pub ci_upper: f64,
    /// Standard error: sample SD of the resampled differences.
    pub se: f64,
}

impl BootstrapCIResult {
    /// Whether `value` lies inside `[ci_lower, ci_upper]`.
    pub fn contains(&self, value: f64) -> bool {
        self.ci_lower <= value && value <= self.ci_upper
    }
}

/// Percentile-bootstrap CI for `mean(a) - mean(b)`.
///
/// Each of the `config.n_bootstrap` iterations resamples `|A|` values from
/// `a` and `|B|` from `b` with replacement and records the difference of
/// their means. The sorted differences give the bounds at indices
/// `floor(alpha/2 · n)` and `floor((1 - alpha/2) · n)` (the latter clamped to
/// the last element). No bias correction is applied.
///
/// If either sample has no valid values the all-zero result is returned
/// without drawing. Cost is `O(n_bootstrap · (|A| + |B|))`.
///
/// ```
/// use panel_stats::bootstrap::{bootstrap_mean_difference_ci, BootstrapConfig};
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
/// let ci = bootstrap_mean_difference_ci(
///     &[7.0, 8.0, 6.0, 9.0, 7.0],
///     &[5.0, 6.0, 4.0, 5.0, 6.0],
///     &BootstrapConfig::default(),
///     &mut rng,
/// );
/// assert!((ci.estimate - 2.2).abs() < 1e-9);
/// assert!(ci.ci_lower <= ci.estimate && ci.estimate <= ci.ci_upper);
/// ```
pub fn bootstrap_mean_difference_ci<A, B, R>(
    a: &[A],
    b: &[B],
    config: &BootstrapConfig,
    rng: &mut R,
) -> BootstrapCIResult
where
    A: Observation,
    B: Observation,
    R: Rng + ?Sized,
{
    let x = valid(a);
    let y = valid(b);
    if x.is_empty() || y.is_empty() {
        return BootstrapCIResult::default();
    }

    let observed = mean_of(&x) - mean_of(&y);
    let n_boot = config.n_bootstrap;
    if n_boot == 0 {
        return BootstrapCIResult {
            estimate: observed,
            ci_lower: observed,
            ci_upper: observed,
            se: 0.0,
        };
    }

    let mut diffs: Vec<f64> = (0..n_boot)
        .map(|_| resample_mean(&x, rng) - resample_mean(&y, rng))
        .collect();
    diffs.sort_by(|p, q| p.total_cmp(q));

    let alpha = config.alpha.clamp(0.0, 1.0);
    let lower_idx = percentile_index(alpha / 2.0, n_boot);
    let upper_idx = percentile_index(1.0 - alpha / 2.0, n_boot);

    BootstrapCIResult {
        estimate: observed,
        ci_lower: diffs[lower_idx],
        ci_upper: diffs[upper_idx],
        se: variance_of(&diffs).sqrt(),
    }
}

/// [`bootstrap_mean_difference_ci`] with a fresh `StdRng` seeded from `seed`.
pub fn bootstrap_mean_difference_ci_seeded<A: Observation, B: Observation>(
    a: &[A],
    b: &[B],
    config: &BootstrapConfig,
    seed: u64,
) -> BootstrapCIResult {
    let mut rng = StdRng::seed_from_u64(seed);
    bootstrap_mean_difference_ci(a, b, config, &mut rng)
}

/// Mean of one resample-with-replacement of `data` (non-empty).
fn resample_mean<R: Rng + ?Sized>(data: &[f64], rng: &mut R) -> f64 {
    let n = data.len();
    let sum: f64 = (0..n).map(|_| data[rng.gen_range(0..n)]).sum();
    sum / n as f64
}

fn percentile_index(q: f64, n: usize) -> usize {
    ((q * n as f64).floor() as usize).min(n - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-10;

    #[test]
    fn empty_sample_is_zero() {
        let empty: [f64; 0] = [];
        let config = BootstrapConfig::default();
        let ci = bootstrap_mean_difference_ci_seeded(&empty, &[1.0], &config, 1);
        assert_eq!(ci, BootstrapCIResult::default());
        let ci = bootstrap_mean_difference_ci_seeded(&[1.0], &[f64::NAN], &config, 1);
        assert_eq!(ci, BootstrapCIResult::default());
    }

    #[test]
    fn estimate_is_observed_difference() {
        let ci = bootstrap_mean_difference_ci_seeded(
            &[7.0, 8.0, 6.0, 9.0, 7.0],
            &[5.0, 6.0, 4.0, 5.0, 6.0],
            &BootstrapConfig::default(),
            42,
        );
        assert!((ci.estimate - 2.2).abs() < TOL);
        assert!(ci.ci_lower <= ci.ci_upper);
        assert!(ci.contains(ci.estimate));
        assert!(ci.se > 0.0);
        // resample means stay inside each sample's range
        assert!(ci.ci_lower >= 6.0 - 6.0 && ci.ci_upper <= 9.0 - 4.0);
    }

    #[test]
    fn constant_samples_have_degenerate_interval() {
        let config = BootstrapConfig::default();
        let ci = bootstrap_mean_difference_ci_seeded(&[3.0; 8], &[1.0; 5], &config, 9);
        assert!((ci.estimate - 2.0).abs() < TOL);
        assert!((ci.ci_lower - 2.0).abs() < TOL);
        assert!((ci.ci_upper - 2.0).abs() < TOL);
        assert!(ci.se.abs() < TOL);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let a = [1.0, 4.0, 2.0, 8.0, 5.0, 7.0];
        let b = [3.0, 3.5, 6.0, 2.0];
        let config = BootstrapConfig::new(500, 0.1).unwrap();
        let first = bootstrap_mean_difference_ci_seeded(&a, &b, &config, 123);
        let second = bootstrap_mean_difference_ci_seeded(&a, &b, &config, 123);
        assert_eq!(first, second);
    }

    #[test]
    fn single_resample_and_zero_resamples() {
        let a = [1.0, 2.0, 3.0];
        let b = [2.0, 2.0];
        let one = BootstrapConfig { n_bootstrap: 1, alpha: 0.05 };
        let ci = bootstrap_mean_difference_ci_seeded(&a, &b, &one, 5);
        assert_eq!(ci.ci_lower, ci.ci_upper);
        assert_eq!(ci.se, 0.0);

        let zero = BootstrapConfig { n_bootstrap: 0, alpha: 0.05 };
        let ci = bootstrap_mean_difference_ci_seeded(&a, &b, &zero, 5);
        assert_eq!(ci.ci_lower, ci.estimate);
        assert_eq!(ci.ci_upper, ci.estimate);
    }

    #[test]
    fn wider_interval_for_smaller_alpha() {
        let a = [1.0, 4.0, 2.0, 8.0, 5.0, 7.0, 3.0, 6.0];
        let b = [3.0, 3.5, 6.0, 2.0, 5.0, 4.0];
        let narrow_config = BootstrapConfig::new(2000, 0.2).unwrap();
        let wide_config = BootstrapConfig::new(2000, 0.01).unwrap();
        let narrow = bootstrap_mean_difference_ci_seeded(&a, &b, &narrow_config, 11);
        let wide = bootstrap_mean_difference_ci_seeded(&a, &b, &wide_config, 11);
        // same seed → same sorted draws, only the cut points differ
        assert!(wide.ci_lower <= narrow.ci_lower);
        assert!(wide.ci_upper >= narrow.ci_upper);
    }

    #[test]
    fn config_validation() {
        assert!(BootstrapConfig::new(2000, 0.05).is_ok());
        assert!(BootstrapConfig::new(0, 0.05).is_err());
        assert!(BootstrapConfig::new(100, 0.0).is_err());
        assert!(BootstrapConfig::new(100, 1.0).is_err());
        assert!(BootstrapConfig::new(100, f64::NAN).is_err());
        assert_eq!(BootstrapConfig::default().n_bootstrap, 2000);
    }

    #[test]
    fn coverage_under_the_null() {
        // Two samples from the same discrete distribution: the 90% interval
        // should contain 0 in roughly 90% of repetitions.
        let mut data_rng = StdRng::seed_from_u64(2024);
        let config = BootstrapConfig::new(400, 0.10).unwrap();
        let reps = 200;
        let mut covered = 0;
        for rep in 0..reps {
            let a: Vec<f64> = (0..40).map(|_| data_rng.gen_range(0..=10) as f64).collect();
            let b: Vec<f64> = (0..40).map(|_| data_rng.gen_range(0..=10) as f64).collect();
            let ci = bootstrap_mean_difference_ci_seeded(&a, &b, &config, rep);
            if ci.contains(0.0) {
                covered += 1;
            }
        }
        let rate = covered as f64 / reps as f64;
        assert!(rate > 0.78 && rate < 0.98, "coverage {rate}");
    }
}
