//! Small-sample statistics for comparing two survey sub-populations.
//!
//! Built for samples of a few dozen respondents answering 0-10 scale items:
//! descriptive statistics, the Mann-Whitney U test, rank-biserial / Hedges' g /
//! CLES effect sizes, percentile-bootstrap intervals, Spearman correlation,
//! Benjamini-Hochberg correction and subgroup breakdowns. Missing answers are
//! filtered everywhere, and degenerate input yields neutral values instead of
//! errors.
//!
//! # Example
//!
//! ```
//! use panel_stats::{run_group_comparison, BootstrapConfig, FavoredGroup};
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let result = run_group_comparison(
//!     &[7.0, 8.0, 6.0, 9.0, 7.0],
//!     &[5.0, 6.0, 4.0, 5.0, 6.0],
//!     "Q4",
//!     "Administrative efficiency",
//!     &BootstrapConfig::default(),
//!     &mut rng,
//! );
//! assert!((result.difference - 2.2).abs() < 1e-10);
//! assert_eq!(result.favored_group, FavoredGroup::Group);
//! assert!(result.effect_sizes.rank_biserial > 0.0);
//! ```

pub mod analysis;
pub mod bootstrap;
pub mod comparison;
pub mod correction;
pub mod correlation;
pub mod descriptive;
pub mod distribution;
pub mod effect_size;
pub mod rank;
pub mod sample;
pub mod subgroup;
pub mod testing;

pub use analysis::{
    analyze, Answer, AnalysisPlan, AnalysisReport, CompositeDefinition, CorrectedComparison,
    CorrelationTarget, OutcomeKeys, ProfileStats, ProfileTarget, Record, SampleSize,
    SatisfactionCorrelation, VariablePair,
};
pub use bootstrap::{
    bootstrap_mean_difference_ci, bootstrap_mean_difference_ci_seeded, BootstrapCIResult,
    BootstrapConfig,
};
pub use comparison::{
    calculate_composite_index, respondent_composite, run_group_comparison, CompositeIndex,
    FavoredGroup, GroupComparisonResult,
};
pub use correction::{adjusted_p_values, benjamini_hochberg, MultipleComparisonResult, PValueEntry};
pub use correlation::{pearson, spearman_correlation, SpearmanResult};
pub use descriptive::{describe, mean, median, percentile, std_dev, variance, DescriptiveStats};
pub use distribution::{erf, normal_cdf, normal_quantile};
pub use effect_size::{
    cohens_d, common_language_effect_size, hedges_g, interpret_cles, rank_biserial,
    ClesInterpretation, EffectMagnitude, EffectSizes,
};
pub use sample::Observation;
pub use subgroup::{
    analyze_subgroups, count_by, Population, SubgroupItem, SubgroupPairwise, SubgroupPlan,
    SubgroupReport, SubgroupSummary,
};
pub use testing::{mann_whitney_u, mann_whitney_u_with, MannWhitneyOptions, MannWhitneyResult};
