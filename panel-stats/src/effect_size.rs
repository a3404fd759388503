//! Effect size measures for two-group comparisons.
//!
//! - [`common_language_effect_size`]: probability that a draw from A beats a draw from B
//! - [`cohens_d`]: standardized mean difference with pooled SD
//! - [`hedges_g`]: Cohen's d with the small-sample bias correction
//! - [`rank_biserial`]: magnitude of separation derived from the Mann-Whitney U
//!
//! Plus plain-language readings: [`EffectMagnitude`] and [`interpret_cles`].

use std::fmt;

use crate::descriptive::{mean_of, variance_of};
use crate::sample::{valid, Observation};

/// Bundle of the three effect sizes reported for every comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct EffectSizes {
    /// Rank-biserial correlation from the Mann-Whitney test, in `[0, 1]`.
    pub rank_biserial: f64,
    /// The same correlation carrying the direction of the difference:
    /// negative when the second sample tends higher.
    pub rank_biserial_signed: f64,
    /// Hedges' g.
    pub hedges_g: f64,
    /// Common language effect size.
    pub cles: f64,
}

/// Common language effect size: P(a > b) + 0.5 · P(a = b) over all pairs.
///
/// Brute-force over `n1 · n2` pairs, which is cheap at survey sample sizes.
/// Returns 0.5 if either sample has no valid values.
pub fn common_language_effect_size<A: Observation, B: Observation>(a: &[A], b: &[B]) -> f64 {
    let x = valid(a);
    let y = valid(b);
    if x.is_empty() || y.is_empty() {
        return 0.5;
    }

    let mut favorable = 0usize;
    let mut ties = 0usize;
    for &xi in &x {
        for &yj in &y {
            if xi > yj {
                favorable += 1;
            } else if xi == yj {
                ties += 1;
            }
        }
    }
    (favorable as f64 + 0.5 * ties as f64) / (x.len() * y.len()) as f64
}

/// Cohen's d: `(mean1 - mean2) / s_pooled`.
///
/// Returns 0 when either group has fewer than 2 valid values or the pooled
/// standard deviation is zero.
pub fn cohens_d<A: Observation, B: Observation>(a: &[A], b: &[B]) -> f64 {
    let x = valid(a);
    let y = valid(b);
    cohens_d_of(&x, &y)
}

/// Hedges' g: Cohen's d scaled by `1 - 3 / (4 (n1 + n2) - 9)`.
///
/// Same degenerate cases as [`cohens_d`].
pub fn hedges_g<A: Observation, B: Observation>(a: &[A], b: &[B]) -> f64 {
    let x = valid(a);
    let y = valid(b);
    let d = cohens_d_of(&x, &y);
    if d == 0.0 {
        return 0.0;
    }
    d * hedges_correction(x.len() + y.len())
}

/// Small-sample bias correction factor for Hedges' g.
pub fn hedges_correction(total_n: usize) -> f64 {
    1.0 - 3.0 / (4.0 * total_n as f64 - 9.0)
}

/// Rank-biserial correlation `1 - 2U / (n1 n2)` with `U = min(U1, U2)`.
///
/// Always in `[0, 1]`: it measures how cleanly the samples separate, not
/// which one is higher. 0 when either size is zero.
pub fn rank_biserial(u: f64, n1: usize, n2: usize) -> f64 {
    let pairs = (n1 * n2) as f64;
    if pairs == 0.0 {
        return 0.0;
    }
    1.0 - 2.0 * u / pairs
}

fn cohens_d_of(x: &[f64], y: &[f64]) -> f64 {
    let n1 = x.len();
    let n2 = y.len();
    if n1 < 2 || n2 < 2 {
        return 0.0;
    }
    let n1_f = n1 as f64;
    let n2_f = n2 as f64;
    let pooled_var =
        ((n1_f - 1.0) * variance_of(x) + (n2_f - 1.0) * variance_of(y)) / (n1_f + n2_f - 2.0);
    let s_pooled = pooled_var.sqrt();
    if s_pooled == 0.0 {
        return 0.0;
    }
    (mean_of(x) - mean_of(y)) / s_pooled
}

// ── Interpretation ─────────────────────────────────────────────────────────

/// Conventional magnitude label for a correlation-type effect size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EffectMagnitude {
    /// |r| < 0.1
    Negligible,
    /// 0.1 ≤ |r| < 0.3
    Small,
    /// 0.3 ≤ |r| < 0.5
    Medium,
    /// |r| ≥ 0.5
    Large,
}

impl EffectMagnitude {
    /// Classify a correlation-type effect size (rank-biserial, rho) by |r|.
    pub fn from_correlation(r: f64) -> Self {
        let r = r.abs();
        if r < 0.1 {
            Self::Negligible
        } else if r < 0.3 {
            Self::Small
        } else if r < 0.5 {
            Self::Medium
        } else {
            Self::Large
        }
    }

    /// Lowercase label, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Negligible => "negligible",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl fmt::Display for EffectMagnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plain-language reading of a CLES value.
///
/// The carried percentage is the share of pairs won by the side that leads,
/// rounded to a whole percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "reading", content = "percent", rename_all = "camelCase")
)]
pub enum ClesInterpretation {
    /// CLES ≥ 70%.
    GroupHigher(u8),
    /// 56% ≤ CLES < 70%.
    SlightGroupAdvantage(u8),
    /// 44% ≤ CLES < 56%.
    NoMeaningfulDifference(u8),
    /// 30% ≤ CLES < 44%; carries 100 - pct.
    SlightIndependentAdvantage(u8),
    /// CLES < 30%; carries 100 - pct.
    IndependentHigher(u8),
}

/// Interpret a CLES value where the first sample is the "group" side.
pub fn interpret_cles(cles: f64) -> ClesInterpretation {
    let pct = (cles.clamp(0.0, 1.0) * 100.0).round() as u8;
    if pct >= 70 {
        ClesInterpretation::GroupHigher(pct)
    } else if pct >= 56 {
        ClesInterpretation::SlightGroupAdvantage(pct)
    } else if pct >= 44 {
        ClesInterpretation::NoMeaningfulDifference(pct)
    } else if pct >= 30 {
        ClesInterpretation::SlightIndependentAdvantage(100 - pct)
    } else {
        ClesInterpretation::IndependentHigher(100 - pct)
    }
}

impl fmt::Display for ClesInterpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::GroupHigher(p) => write!(f, "Group respondents score higher {p}% of the time"),
            Self::SlightGroupAdvantage(p) => {
                write!(f, "Slight advantage for group respondents ({p}%)")
            }
            Self::NoMeaningfulDifference(p) => write!(f, "No meaningful difference ({p}%)"),
            Self::SlightIndependentAdvantage(p) => {
                write!(f, "Slight advantage for independent respondents ({p}%)")
            }
            Self::IndependentHigher(p) => {
                write!(f, "Independent respondents score higher {p}% of the time")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-10;

    #[test]
    fn cles_basic() {
        // pairs: (3,1) win, (3,3) tie, (5,1) win, (5,3) win → (3 + 0.5) / 4
        let c = common_language_effect_size(&[3.0, 5.0], &[1.0, 3.0]);
        assert!((c - 0.875).abs() < TOL);
    }

    #[test]
    fn cles_degenerate() {
        let empty: [f64; 0] = [];
        assert_eq!(common_language_effect_size(&empty, &[1.0]), 0.5);
        assert_eq!(common_language_effect_size(&[1.0], &[f64::NAN]), 0.5);
    }

    #[test]
    fn cles_all_tied() {
        assert!((common_language_effect_size(&[2.0, 2.0], &[2.0]) - 0.5).abs() < TOL);
    }

    #[test]
    fn cohens_d_known() {
        // means 3 and 4, both sample SD sqrt(2.5) → d = -1/sqrt(2.5)
        let d = cohens_d(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 3.0, 4.0, 5.0, 6.0]);
        assert!((d + 1.0 / 2.5f64.sqrt()).abs() < TOL);
    }

    #[test]
    fn hedges_g_applies_correction() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [2.0, 3.0, 4.0, 5.0, 6.0];
        let d = cohens_d(&a, &b);
        let g = hedges_g(&a, &b);
        assert!((g - d * (1.0 - 3.0 / 31.0)).abs() < TOL);
        assert!(g.abs() < d.abs());
    }

    #[test]
    fn hedges_g_sign_flips() {
        let a = [7.0, 8.0, 6.0, 9.0, 7.0];
        let b = [5.0, 6.0, 4.0, 5.0, 6.0];
        assert!(hedges_g(&a, &b) > 0.0);
        assert!((hedges_g(&a, &b) + hedges_g(&b, &a)).abs() < TOL);
    }

    #[test]
    fn hedges_g_degenerate() {
        assert_eq!(hedges_g(&[1.0], &[2.0, 3.0]), 0.0);
        assert_eq!(hedges_g(&[2.0, 2.0], &[2.0, 2.0, 2.0]), 0.0);
        assert_eq!(hedges_g(&[1.0, f64::NAN], &[2.0, 3.0]), 0.0);
    }

    #[test]
    fn correction_shrinks_more_for_small_n() {
        assert!(hedges_correction(6) < hedges_correction(20));
        assert!(hedges_correction(100) < 1.0);
    }

    #[test]
    fn rank_biserial_range() {
        assert_eq!(rank_biserial(0.0, 2, 3), 1.0);
        assert_eq!(rank_biserial(3.0, 2, 3), 0.0);
        assert!((rank_biserial(1.0, 2, 3) - 2.0 / 3.0).abs() < TOL);
        assert_eq!(rank_biserial(0.0, 0, 3), 0.0);
    }

    #[test]
    fn rank_biserial_of_separated_samples_is_one() {
        // U = 0 for 3 vs 3 fully separated: 1 - 2·0/9
        assert_eq!(rank_biserial(0.0, 3, 3), 1.0);
        assert!((rank_biserial(4.0, 3, 3) - 1.0 / 9.0).abs() < TOL);
    }

    #[test]
    fn magnitude_thresholds() {
        assert_eq!(EffectMagnitude::from_correlation(0.05), EffectMagnitude::Negligible);
        assert_eq!(EffectMagnitude::from_correlation(-0.2), EffectMagnitude::Small);
        assert_eq!(EffectMagnitude::from_correlation(0.3), EffectMagnitude::Medium);
        assert_eq!(EffectMagnitude::from_correlation(-0.75), EffectMagnitude::Large);
        assert_eq!(EffectMagnitude::Large.to_string(), "large");
    }

    #[test]
    fn cles_readings() {
        assert_eq!(interpret_cles(0.72), ClesInterpretation::GroupHigher(72));
        assert_eq!(interpret_cles(0.6), ClesInterpretation::SlightGroupAdvantage(60));
        assert_eq!(interpret_cles(0.5), ClesInterpretation::NoMeaningfulDifference(50));
        assert_eq!(interpret_cles(0.35), ClesInterpretation::SlightIndependentAdvantage(65));
        assert_eq!(interpret_cles(0.1), ClesInterpretation::IndependentHigher(90));
        assert_eq!(
            interpret_cles(0.9).to_string(),
            "Group respondents score higher 90% of the time"
        );
    }
}
