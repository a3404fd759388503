//! Hypothesis testing.
//!
//! Provides the non-parametric [`mann_whitney_u`] test used to compare the
//! two sub-populations on each survey item.

use panel_core::{Scored, Summarizable};

use crate::distribution::normal_cdf;
use crate::effect_size::rank_biserial;
use crate::rank::{average_ranks, tie_run_lengths};
use crate::sample::{valid, Observation};

/// Result of a Mann-Whitney U test.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MannWhitneyResult {
    /// The smaller of U1 and U2.
    #[cfg_attr(feature = "serde", serde(rename = "U"))]
    pub u: f64,
    /// Standardized U1 under the normal approximation.
    pub z: f64,
    /// Two-tailed p-value.
    pub p_value: f64,
    /// Rank-biserial correlation `1 - 2U / (n1 n2)`, in `[0, 1]`. The
    /// direction lives in `z`; see [`MannWhitneyResult::signed_effect_size`].
    pub effect_size: f64,
    /// Valid observations in the first sample.
    pub n1: usize,
    /// Valid observations in the second sample.
    pub n2: usize,
}

impl MannWhitneyResult {
    /// The result reported when either sample has no valid observations.
    pub fn neutral(n1: usize, n2: usize) -> Self {
        Self {
            u: 0.0,
            z: 0.0,
            p_value: 1.0,
            effect_size: 0.0,
            n1,
            n2,
        }
    }

    /// The effect size with the sign of `z`: negative when the second
    /// sample tends higher.
    pub fn signed_effect_size(&self) -> f64 {
        if self.z < 0.0 {
            -self.effect_size
        } else {
            self.effect_size
        }
    }
}

impl Scored for MannWhitneyResult {
    fn score(&self) -> f64 {
        self.p_value
    }
}

impl Summarizable for MannWhitneyResult {
    fn summary(&self) -> String {
        format!(
            "Mann-Whitney U: U={:.1}, z={:.4}, p={:.6}, r={:.4} (n1={}, n2={})",
            self.u, self.z, self.p_value, self.effect_size, self.n1, self.n2,
        )
    }
}

/// Options for [`mann_whitney_u_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct MannWhitneyOptions {
    /// Shrink the variance of U by `1 - Σ(t³ - t) / (N³ - N)` over tied runs.
    ///
    /// Off by default so results match the established uncorrected output.
    pub tie_correction: bool,
}

// ── Mann-Whitney U test ────────────────────────────────────────────────────

/// Mann-Whitney U test (Wilcoxon rank-sum test) with default options.
///
/// Non-parametric test for whether one of two independent samples tends to
/// have larger values. Uses the normal approximation for the two-tailed
/// p-value; there is no exact small-sample table.
///
/// Missing values are dropped. If either sample is then empty the
/// [`MannWhitneyResult::neutral`] result is returned.
///
/// ```
/// use panel_stats::testing::mann_whitney_u;
///
/// let r = mann_whitney_u(&[7.0, 8.0, 6.0, 9.0, 7.0], &[5.0, 6.0, 4.0, 5.0, 6.0]);
/// assert!(r.p_value < 0.05);
/// assert!(r.effect_size > 0.0);
/// ```
pub fn mann_whitney_u<A: Observation, B: Observation>(a: &[A], b: &[B]) -> MannWhitneyResult {
    mann_whitney_u_with(a, b, &MannWhitneyOptions::default())
}

/// Mann-Whitney U test with explicit [`MannWhitneyOptions`].
pub fn mann_whitney_u_with<A: Observation, B: Observation>(
    a: &[A],
    b: &[B],
    options: &MannWhitneyOptions,
) -> MannWhitneyResult {
    let x = valid(a);
    let y = valid(b);
    let n1 = x.len();
    let n2 = y.len();
    if n1 == 0 || n2 == 0 {
        return MannWhitneyResult::neutral(n1, n2);
    }
    let n = n1 + n2;

    // Combine, rank, and sum ranks for the first sample.
    let mut combined: Vec<f64> = Vec::with_capacity(n);
    combined.extend_from_slice(&x);
    combined.extend_from_slice(&y);
    let ranks = average_ranks(&combined);

    let r1: f64 = ranks[..n1].iter().sum();
    let n1_f = n1 as f64;
    let n2_f = n2 as f64;
    let n_f = n as f64;
    let u1 = r1 - n1_f * (n1_f + 1.0) / 2.0;
    let u2 = n1_f * n2_f - u1;
    let u = u1.min(u2);

    // Normal approximation
    let mean_u = n1_f * n2_f / 2.0;
    let mut var_u = n1_f * n2_f * (n_f + 1.0) / 12.0;
    if options.tie_correction && n > 1 {
        let ties: f64 = tie_run_lengths(&combined)
            .into_iter()
            .map(|t| {
                let t = t as f64;
                t * t * t - t
            })
            .sum();
        var_u *= 1.0 - ties / (n_f * n_f * n_f - n_f);
    }
    let sd_u = var_u.max(0.0).sqrt();

    let z = if sd_u > 0.0 { (u1 - mean_u) / sd_u } else { 0.0 };
    let p_value = (2.0 * (1.0 - normal_cdf(z.abs()))).clamp(0.0, 1.0);

    MannWhitneyResult {
        u,
        z,
        p_value,
        effect_size: rank_biserial(u, n1, n2),
        n1,
        n2,
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────
