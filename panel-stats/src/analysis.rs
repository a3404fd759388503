//! Whole-survey analysis driven by a declarative plan.
//!
//! An [`AnalysisPlan`] names which answers to compare between the two
//! sub-populations, which composite indices to build and which items to
//! correlate against overall satisfaction. It may also ask for respondent
//! profile descriptives and a breakdown by a categorical answer.
//! [`analyze`] runs every comparison, corrects the p-values jointly with
//! Benjamini-Hochberg and merges the adjusted values back into each
//! comparison.

use std::collections::{HashMap, HashSet};

use panel_core::{Annotated, PanelError, Result, Scored};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::bootstrap::BootstrapConfig;
use crate::comparison::{
    calculate_composite_index, respondent_composite, run_group_comparison, CompositeIndex,
    GroupComparisonResult,
};
use crate::correction::{benjamini_hochberg, MultipleComparisonResult, PValueEntry};
use crate::correlation::{spearman_correlation, SpearmanResult, MIN_PAIRS};
use crate::descriptive::{describe, DescriptiveStats};
use crate::sample::valid;
use crate::subgroup::{
    analyze_subgroups, count_by, Population, SubgroupCount, SubgroupPlan, SubgroupReport,
};

/// One answer: a scale value or a categorical label.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Number(f64),
    Text(String),
}

impl Answer {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Answer::Number(v) => Some(*v),
            Answer::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Answer::Text(s) => Some(s),
            Answer::Number(_) => None,
        }
    }
}

impl From<f64> for Answer {
    fn from(v: f64) -> Self {
        Answer::Number(v)
    }
}

impl From<&str> for Answer {
    fn from(s: &str) -> Self {
        Answer::Text(s.to_string())
    }
}

impl From<String> for Answer {
    fn from(s: String) -> Self {
        Answer::Text(s)
    }
}

/// One respondent's answers, keyed by question id.
pub type Record = HashMap<String, Answer>;

/// Numeric answer to `key`; absent and text answers are `None`.
pub fn answer(record: &Record, key: &str) -> Option<f64> {
    record.get(key).and_then(Answer::as_number)
}

/// A variable asked of both sub-populations, possibly under different keys.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct VariablePair {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub theme: String,
    pub group_key: String,
    pub independent_key: String,
}

impl VariablePair {
    pub fn new(
        name: impl Into<String>,
        theme: impl Into<String>,
        group_key: impl Into<String>,
        independent_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            theme: theme.into(),
            group_key: group_key.into(),
            independent_key: independent_key.into(),
        }
    }
}

/// Components averaged per respondent into a composite score.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CompositeDefinition {
    pub name: String,
    pub group_components: Vec<String>,
    pub independent_components: Vec<String>,
}

/// An item correlated against the satisfaction outcome.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CorrelationTarget {
    pub name: String,
    pub group_key: String,
    pub independent_key: String,
}

/// A profile question described separately for each sub-population.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ProfileTarget {
    pub name: String,
    pub group_key: String,
    pub independent_key: String,
    /// When set, answers are reported as `reference - answer`, turning a
    /// year into the years elapsed since it.
    #[cfg_attr(feature = "serde", serde(default))]
    pub reference: Option<f64>,
}

/// Keys of the overall satisfaction question in each sub-population.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct OutcomeKeys {
    pub group_key: String,
    pub independent_key: String,
}

/// Everything [`analyze`] should compute.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct AnalysisPlan {
    pub variables: Vec<VariablePair>,
    pub composites: Vec<CompositeDefinition>,
    pub correlations: Vec<CorrelationTarget>,
    /// Outcome the correlation targets are measured against. Without it no
    /// correlations are computed.
    pub satisfaction: Option<OutcomeKeys>,
    pub profiles: Vec<ProfileTarget>,
    /// Breakdown of one sub-population by a categorical answer.
    pub subgroups: Option<SubgroupPlan>,
    /// False discovery rate for the Benjamini-Hochberg step.
    pub alpha: f64,
    pub bootstrap: BootstrapConfig,
    /// Base seed; variable `i` draws from `seed + i`. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for AnalysisPlan {
    fn default() -> Self {
        Self {
            variables: Vec::new(),
            composites: Vec::new(),
            correlations: Vec::new(),
            satisfaction: None,
            profiles: Vec::new(),
            subgroups: None,
            alpha: 0.05,
            bootstrap: BootstrapConfig::default(),
            seed: None,
        }
    }
}

impl AnalysisPlan {
    /// Check the plan before running it.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::InvalidInput`] for duplicate variable names
    /// (corrected p-values are merged back by name), `alpha` outside `(0, 1)`,
    /// a subgroup `min_n` of zero or an invalid bootstrap configuration.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for v in &self.variables {
            if !seen.insert(v.name.as_str()) {
                return Err(PanelError::InvalidInput(format!(
                    "analysis: duplicate variable name '{}'",
                    v.name
                )));
            }
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(PanelError::InvalidInput(format!(
                "analysis: alpha must be in (0, 1), got {}",
                self.alpha
            )));
        }
        if matches!(&self.subgroups, Some(s) if s.min_n == 0) {
            return Err(PanelError::InvalidInput(
                "analysis: subgroup min_n must be at least 1".into(),
            ));
        }
        self.bootstrap.validate()
    }
}

/// A comparison together with its multiple-testing outcome.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CorrectedComparison {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub comparison: GroupComparisonResult,
    pub adjusted_p_value: f64,
    pub significant_after_correction: bool,
}

impl Annotated for CorrectedComparison {
    fn name(&self) -> &str {
        self.comparison.name()
    }

    fn description(&self) -> Option<&str> {
        self.comparison.description()
    }
}

impl Scored for CorrectedComparison {
    fn score(&self) -> f64 {
        self.adjusted_p_value
    }
}

/// Spearman correlation of one item with satisfaction, per sub-population.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SatisfactionCorrelation {
    pub name: String,
    pub group: SpearmanResult,
    pub independent: SpearmanResult,
}

/// Descriptives of one profile question on each side.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProfileStats {
    pub name: String,
    pub group: DescriptiveStats,
    pub independent: DescriptiveStats,
}

/// Respondent counts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SampleSize {
    pub total: usize,
    pub group: usize,
    pub independent: usize,
    /// Counts per answer to the subgroup question, including unanswered and
    /// excluded ones. Empty without a subgroup plan.
    pub by_subgroup: Vec<SubgroupCount>,
}

/// Output of [`analyze`]; every list follows the plan's order.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct AnalysisReport {
    pub sample_size: SampleSize,
    pub comparisons: Vec<CorrectedComparison>,
    /// Benjamini-Hochberg output, ascending by raw p-value.
    pub multiple_comparisons: Vec<MultipleComparisonResult>,
    pub composites: Vec<CompositeIndex>,
    pub correlations: Vec<SatisfactionCorrelation>,
    pub profiles: Vec<ProfileStats>,
    pub subgroups: Option<SubgroupReport>,
}

impl AnalysisReport {
    /// Comparisons that survive the false discovery rate correction.
    pub fn significant(&self) -> impl Iterator<Item = &CorrectedComparison> {
        self.comparisons
            .iter()
            .filter(|c| c.significant_after_correction)
    }
}

/// Run a plan over the two sub-populations' records.
///
/// Variables with no valid answer on either side are skipped. Each remaining
/// variable gets its own random generator so results do not depend on
/// execution order; with the `parallel` feature the comparisons run on
/// rayon's pool.
///
/// # Errors
///
/// Fails only if the plan does not [validate](AnalysisPlan::validate).
pub fn analyze(
    plan: &AnalysisPlan,
    group_records: &[Record],
    independent_records: &[Record],
) -> Result<AnalysisReport> {
    plan.validate()?;
    log::debug!(
        "analysis: {} variables, {} group / {} independent respondents",
        plan.variables.len(),
        group_records.len(),
        independent_records.len()
    );
    for (label, records) in [("group", group_records), ("independent", independent_records)] {
        if records.len() < MIN_PAIRS {
            log::warn!("analysis: only {} {label} respondents", records.len());
        }
    }

    let compare = |(index, pair): (usize, &VariablePair)| {
        compare_variable(plan, index, pair, group_records, independent_records)
    };

    #[cfg(feature = "parallel")]
    let comparisons: Vec<GroupComparisonResult> = {
        use rayon::prelude::*;
        plan.variables
            .par_iter()
            .enumerate()
            .filter_map(compare)
            .collect()
    };
    #[cfg(not(feature = "parallel"))]
    let comparisons: Vec<GroupComparisonResult> =
        plan.variables.iter().enumerate().filter_map(compare).collect();

    let entries: Vec<PValueEntry> = comparisons
        .iter()
        .map(|c| PValueEntry::new(c.variable.as_str(), c.mann_whitney.p_value))
        .collect();
    let multiple_comparisons = benjamini_hochberg(&entries, plan.alpha);
    let comparisons = merge_corrections(comparisons, &multiple_comparisons);

    let composites = plan
        .composites
        .iter()
        .map(|def| composite(def, group_records, independent_records))
        .collect();

    let correlations = match &plan.satisfaction {
        Some(outcome) => plan
            .correlations
            .iter()
            .map(|target| SatisfactionCorrelation {
                name: target.name.clone(),
                group: paired_spearman(group_records, &target.group_key, &outcome.group_key),
                independent: paired_spearman(
                    independent_records,
                    &target.independent_key,
                    &outcome.independent_key,
                ),
            })
            .collect(),
        None => {
            if !plan.correlations.is_empty() {
                log::warn!("analysis: correlation targets given without a satisfaction outcome");
            }
            Vec::new()
        }
    };

    let profiles = plan
        .profiles
        .iter()
        .map(|target| profile(target, group_records, independent_records))
        .collect();

    let (by_subgroup, subgroups) = match &plan.subgroups {
        Some(subgroup_plan) => {
            let records = match subgroup_plan.population {
                Population::Group => group_records,
                Population::Independent => independent_records,
            };
            (
                count_by(records, &subgroup_plan.key),
                Some(analyze_subgroups(subgroup_plan, records)),
            )
        }
        None => (Vec::new(), None),
    };

    Ok(AnalysisReport {
        sample_size: SampleSize {
            total: group_records.len() + independent_records.len(),
            group: group_records.len(),
            independent: independent_records.len(),
            by_subgroup,
        },
        comparisons,
        multiple_comparisons,
        composites,
        correlations,
        profiles,
        subgroups,
    })
}

/// Numeric answers to `key` in respondent order; absent answers are `None`.
pub fn column(records: &[Record], key: &str) -> Vec<Option<f64>> {
    records.iter().map(|r| answer(r, key)).collect()
}

fn compare_variable(
    plan: &AnalysisPlan,
    index: usize,
    pair: &VariablePair,
    group_records: &[Record],
    independent_records: &[Record],
) -> Option<GroupComparisonResult> {
    let group = column(group_records, &pair.group_key);
    let independent = column(independent_records, &pair.independent_key);
    let n_group = valid(&group).len();
    let n_independent = valid(&independent).len();

    if n_group == 0 && n_independent == 0 {
        log::warn!("analysis: skipping '{}', no answers on either side", pair.name);
        return None;
    }
    if n_group < MIN_PAIRS || n_independent < MIN_PAIRS {
        log::warn!(
            "analysis: '{}' has few answers (group {n_group}, independent {n_independent})",
            pair.name
        );
    }

    let mut rng = match plan.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
        None => StdRng::from_entropy(),
    };
    let result = run_group_comparison(
        &group,
        &independent,
        &pair.name,
        &pair.theme,
        &plan.bootstrap,
        &mut rng,
    );
    log::debug!(
        "analysis: '{}' diff={:.3} p={:.4}",
        pair.name,
        result.difference,
        result.mann_whitney.p_value
    );
    Some(result)
}

fn merge_corrections(
    comparisons: Vec<GroupComparisonResult>,
    corrected: &[MultipleComparisonResult],
) -> Vec<CorrectedComparison> {
    let by_name: HashMap<&str, &MultipleComparisonResult> =
        corrected.iter().map(|c| (c.variable.as_str(), c)).collect();
    comparisons
        .into_iter()
        .map(|comparison| {
            let (adjusted_p_value, significant_after_correction) =
                match by_name.get(comparison.variable.as_str()) {
                    Some(c) => (c.adjusted_p_value, c.significant),
                    None => (comparison.mann_whitney.p_value, false),
                };
            CorrectedComparison {
                comparison,
                adjusted_p_value,
                significant_after_correction,
            }
        })
        .collect()
}

fn composite(
    def: &CompositeDefinition,
    group_records: &[Record],
    independent_records: &[Record],
) -> CompositeIndex {
    let group_scores = respondent_scores(group_records, &def.group_components);
    let independent_scores = respondent_scores(independent_records, &def.independent_components);
    calculate_composite_index(
        &group_scores,
        &independent_scores,
        &def.name,
        &def.group_components,
    )
}

fn respondent_scores(records: &[Record], components: &[String]) -> Vec<Option<f64>> {
    records
        .iter()
        .map(|r| {
            let answers: Vec<Option<f64>> = components.iter().map(|k| answer(r, k)).collect();
            respondent_composite(&answers)
        })
        .collect()
}

fn profile(
    target: &ProfileTarget,
    group_records: &[Record],
    independent_records: &[Record],
) -> ProfileStats {
    let shifted = |records: &[Record], key: &str| -> Vec<Option<f64>> {
        column(records, key)
            .into_iter()
            .map(|v| match target.reference {
                Some(reference) => v.map(|v| reference - v),
                None => v,
            })
            .collect()
    };
    ProfileStats {
        name: target.name.clone(),
        group: describe(&shifted(group_records, &target.group_key)),
        independent: describe(&shifted(independent_records, &target.independent_key)),
    }
}

fn paired_spearman(records: &[Record], item_key: &str, outcome_key: &str) -> SpearmanResult {
    spearman_correlation(&column(records, item_key), &column(records, outcome_key))
}
