//! Two-group comparison of one survey item, and composite indices.
//!
//! [`run_group_comparison`] bundles every statistic reported for a variable:
//! descriptives for both sub-populations, the Mann-Whitney test, the effect
//! sizes and a bootstrap interval for the mean difference.

use std::fmt;

use panel_core::{Annotated, Scored, Summarizable};
use rand::Rng;

use crate::bootstrap::{bootstrap_mean_difference_ci, BootstrapCIResult, BootstrapConfig};
use crate::descriptive::{describe, mean_of, DescriptiveStats};
use crate::effect_size::{common_language_effect_size, hedges_g, EffectSizes};
use crate::sample::{valid, Observation};
use crate::testing::{mann_whitney_u, MannWhitneyResult};

/// Absolute mean difference above which one sub-population is called favored.
pub const FAVORED_THRESHOLD: f64 = 0.5;

/// Which sub-population scores meaningfully higher on a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FavoredGroup {
    Group,
    Independent,
    None,
}

impl FavoredGroup {
    /// Classify a mean difference (group minus independent).
    pub fn from_difference(difference: f64) -> Self {
        if difference > FAVORED_THRESHOLD {
            FavoredGroup::Group
        } else if difference < -FAVORED_THRESHOLD {
            FavoredGroup::Independent
        } else {
            FavoredGroup::None
        }
    }

    /// Lowercase label, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            FavoredGroup::Group => "group",
            FavoredGroup::Independent => "independent",
            FavoredGroup::None => "none",
        }
    }
}

impl fmt::Display for FavoredGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything reported for one variable.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct GroupComparisonResult {
    pub variable: String,
    pub theme: String,
    pub group_stats: DescriptiveStats,
    pub independent_stats: DescriptiveStats,
    pub mann_whitney: MannWhitneyResult,
    pub effect_sizes: EffectSizes,
    #[cfg_attr(feature = "serde", serde(rename = "meanDiffCI"))]
    pub mean_diff_ci: BootstrapCIResult,
    /// `group_stats.mean - independent_stats.mean`.
    pub difference: f64,
    pub favored_group: FavoredGroup,
}

impl Annotated for GroupComparisonResult {
    fn name(&self) -> &str {
        &self.variable
    }

    fn description(&self) -> Option<&str> {
        Some(&self.theme)
    }
}

impl Scored for GroupComparisonResult {
    fn score(&self) -> f64 {
        self.mann_whitney.p_value
    }
}

impl Summarizable for GroupComparisonResult {
    fn summary(&self) -> String {
        format!(
            "{} [{}]: diff={:.3} (95% CI {:.3}..{:.3}), p={:.4}, r={:.3}, g={:.3}, favored={}",
            self.variable,
            self.theme,
            self.difference,
            self.mean_diff_ci.ci_lower,
            self.mean_diff_ci.ci_upper,
            self.mann_whitney.p_value,
            self.effect_sizes.rank_biserial,
            self.effect_sizes.hedges_g,
            self.favored_group,
        )
    }
}

/// Compare the group and independent answers to one variable.
///
/// The bootstrap interval draws from `rng`; every other field is
/// deterministic. Missing values are filtered independently on each side.
///
/// ```
/// use panel_stats::bootstrap::BootstrapConfig;
/// use panel_stats::comparison::{run_group_comparison, FavoredGroup};
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(1);
/// let result = run_group_comparison(
///     &[7.0, 8.0, 6.0, 9.0, 7.0],
///     &[5.0, 6.0, 4.0, 5.0, 6.0],
///     "q_trust",
///     "Trust",
///     &BootstrapConfig::default(),
///     &mut rng,
/// );
/// assert_eq!(result.favored_group, FavoredGroup::Group);
/// ```
pub fn run_group_comparison<A, B, R>(
    group: &[A],
    independent: &[B],
    variable: &str,
    theme: &str,
    config: &BootstrapConfig,
    rng: &mut R,
) -> GroupComparisonResult
where
    A: Observation,
    B: Observation,
    R: Rng + ?Sized,
{
    let group_stats = describe(group);
    let independent_stats = describe(independent);
    let mann_whitney = mann_whitney_u(group, independent);
    let effect_sizes = EffectSizes {
        rank_biserial: mann_whitney.effect_size,
        rank_biserial_signed: mann_whitney.signed_effect_size(),
        hedges_g: hedges_g(group, independent),
        cles: common_language_effect_size(group, independent),
    };
    let mean_diff_ci = bootstrap_mean_difference_ci(group, independent, config, rng);

    let difference = group_stats.mean - independent_stats.mean;
    GroupComparisonResult {
        variable: variable.to_string(),
        theme: theme.to_string(),
        group_stats,
        independent_stats,
        mann_whitney,
        effect_sizes,
        mean_diff_ci,
        difference,
        favored_group: FavoredGroup::from_difference(difference),
    }
}

// ── Composite indices ──────────────────────────────────────────────────────

/// Mean-of-means score over a subset of variables.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CompositeIndex {
    pub name: String,
    pub components: Vec<String>,
    pub group_score: f64,
    pub independent_score: f64,
    pub difference: f64,
}

impl Annotated for CompositeIndex {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Scored for CompositeIndex {
    fn score(&self) -> f64 {
        self.difference
    }
}

/// Average per-respondent composite scores on each side.
///
/// Each side's score is the mean of its valid values, or 0 if it has none.
/// No significance test is attached.
pub fn calculate_composite_index<A: Observation, B: Observation>(
    group_scores: &[A],
    independent_scores: &[B],
    name: &str,
    components: &[String],
) -> CompositeIndex {
    let group_score = mean_of(&valid(group_scores));
    let independent_score = mean_of(&valid(independent_scores));
    CompositeIndex {
        name: name.to_string(),
        components: components.to_vec(),
        group_score,
        independent_score,
        difference: group_score - independent_score,
    }
}

/// One respondent's composite score: the mean of the components they answered.
///
/// `None` when none of the components has a valid answer.
pub fn respondent_composite<T: Observation>(values: &[T]) -> Option<f64> {
    let answered = valid(values);
    if answered.is_empty() {
        None
    } else {
        Some(mean_of(&answered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const TOL: f64 = 1e-10;

    fn compare(group: &[f64], independent: &[f64]) -> GroupComparisonResult {
        let mut rng = StdRng::seed_from_u64(99);
        run_group_comparison(
            group,
            independent,
            "q_trust",
            "Trust",
            &BootstrapConfig::default(),
            &mut rng,
        )
    }

    #[test]
    fn group_clearly_higher() {
        let r = compare(&[7.0, 8.0, 6.0, 9.0, 7.0], &[5.0, 6.0, 4.0, 5.0, 6.0]);
        assert!((r.difference - 2.2).abs() < TOL);
        assert_eq!(r.favored_group, FavoredGroup::Group);
        assert!(r.effect_sizes.rank_biserial > 0.0);
        assert!(r.effect_sizes.hedges_g > 0.0);
        assert!(r.effect_sizes.cles > 0.5);
        assert_eq!(r.effect_sizes.rank_biserial, r.mann_whitney.effect_size);
        assert_eq!(r.effect_sizes.rank_biserial_signed, r.effect_sizes.rank_biserial);
        assert!((r.mean_diff_ci.estimate - r.difference).abs() < TOL);
        assert_eq!(r.group_stats.n, 5);
        assert_eq!(r.independent_stats.n, 5);
        assert_eq!(r.name(), "q_trust");
        assert_eq!(r.description(), Some("Trust"));
    }

    #[test]
    fn independent_higher_flips_everything() {
        let r = compare(&[5.0, 6.0, 4.0, 5.0, 6.0], &[7.0, 8.0, 6.0, 9.0, 7.0]);
        assert_eq!(r.favored_group, FavoredGroup::Independent);
        assert!(r.effect_sizes.rank_biserial > 0.0);
        assert!(r.effect_sizes.rank_biserial_signed < 0.0);
        assert_eq!(r.effect_sizes.rank_biserial, -r.effect_sizes.rank_biserial_signed);
        assert!(r.effect_sizes.hedges_g < 0.0);
        assert!(r.effect_sizes.cles < 0.5);
    }

    #[test]
    fn threshold_is_exclusive() {
        assert_eq!(FavoredGroup::from_difference(0.5), FavoredGroup::None);
        assert_eq!(FavoredGroup::from_difference(-0.5), FavoredGroup::None);
        assert_eq!(FavoredGroup::from_difference(0.51), FavoredGroup::Group);
        assert_eq!(FavoredGroup::from_difference(-0.51), FavoredGroup::Independent);
        assert_eq!(FavoredGroup::None.to_string(), "none");
    }

    #[test]
    fn empty_side_degrades() {
        let r = compare(&[], &[5.0, 6.0]);
        assert_eq!(r.group_stats.n, 0);
        assert_eq!(r.mann_whitney.p_value, 1.0);
        assert_eq!(r.effect_sizes.cles, 0.5);
        assert_eq!(r.mean_diff_ci, BootstrapCIResult::default());
        assert_eq!(r.favored_group, FavoredGroup::Independent);
    }

    #[test]
    fn composite_index() {
        let components = vec!["q1".to_string(), "q2".to_string()];
        let independent = [Some(5.0), None, Some(6.0)];
        let c = calculate_composite_index(&[6.0, 8.0], &independent, "Trust", &components);
        assert!((c.group_score - 7.0).abs() < TOL);
        assert!((c.independent_score - 5.5).abs() < TOL);
        assert!((c.difference - 1.5).abs() < TOL);
        assert_eq!(c.components, components);

        let empty: [f64; 0] = [];
        let c = calculate_composite_index(&empty, &[4.0], "Empty", &[]);
        assert_eq!(c.group_score, 0.0);
        assert!((c.difference + 4.0).abs() < TOL);
    }

    #[test]
    fn respondent_composite_skips_unanswered() {
        assert_eq!(respondent_composite(&[Some(4.0), None, Some(8.0)]), Some(6.0));
        assert_eq!(respondent_composite::<Option<f64>>(&[None, None]), None);
        assert_eq!(respondent_composite(&[f64::NAN]), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_field_names() {
        let r = compare(&[7.0, 8.0, 6.0], &[5.0, 6.0, 4.0]);
        let json = serde_json::to_value(&r).unwrap();
        assert!(json.get("groupStats").is_some());
        assert!(json.get("meanDiffCI").is_some());
        assert_eq!(json["favoredGroup"], "group");
        assert!(json["mannWhitney"].get("U").is_some());
        assert!(json["mannWhitney"].get("pValue").is_some());
        assert!(json["effectSizes"].get("rankBiserial").is_some());
        assert!(json["effectSizes"].get("rankBiserialSigned").is_some());
        assert!(json["meanDiffCI"].get("ci_lower").is_some());
    }
}
