//! Breakdown of one sub-population by a categorical answer.
//!
//! Respondents are split on a text answer (an organisation type, a region),
//! each large enough subgroup is summarized item by item, and qualifying
//! subgroups are compared pairwise on one outcome with the Mann-Whitney test.

use std::collections::HashMap;

use crate::analysis::{answer, Answer, Record};
use crate::descriptive::{describe, mean_of, DescriptiveStats};
use crate::sample::valid;
use crate::testing::mann_whitney_u;

/// Smallest subgroup that is summarized or compared.
pub const DEFAULT_MIN_N: usize = 3;

/// Label given to respondents without an answer to the grouping question.
pub const UNKNOWN: &str = "unknown";

/// Which sub-population a [`SubgroupPlan`] splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Population {
    #[default]
    Group,
    Independent,
}

/// A numeric answer reported under a display name.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubgroupItem {
    pub name: String,
    pub key: String,
}

impl SubgroupItem {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }
}

/// How to split respondents and what to report per subgroup.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SubgroupPlan {
    /// Question whose text answer names the subgroup.
    pub key: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub population: Population,
    /// Items summarized within every subgroup.
    #[cfg_attr(feature = "serde", serde(default))]
    pub items: Vec<SubgroupItem>,
    /// Item compared between every pair of subgroups.
    #[cfg_attr(feature = "serde", serde(default))]
    pub outcome: Option<SubgroupItem>,
    #[cfg_attr(feature = "serde", serde(default = "default_min_n"))]
    pub min_n: usize,
    /// Answers that never form a subgroup, such as "prefer_not_say".
    /// [`UNKNOWN`] is always excluded.
    #[cfg_attr(feature = "serde", serde(default))]
    pub excluded: Vec<String>,
}

#[cfg(feature = "serde")]
fn default_min_n() -> usize {
    DEFAULT_MIN_N
}

impl SubgroupPlan {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            population: Population::Group,
            items: Vec::new(),
            outcome: None,
            min_n: DEFAULT_MIN_N,
            excluded: Vec::new(),
        }
    }

    fn is_excluded(&self, label: &str) -> bool {
        label == UNKNOWN || self.excluded.iter().any(|e| e == label)
    }
}

/// Number of respondents giving one answer to the grouping question.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubgroupCount {
    pub subgroup: String,
    pub n: usize,
}

/// Descriptives of one item within a subgroup.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemStats {
    pub name: String,
    pub stats: DescriptiveStats,
}

/// Everything reported for one subgroup.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SubgroupSummary {
    pub subgroup: String,
    /// Respondents in the subgroup, answered or not.
    pub n: usize,
    pub items: Vec<ItemStats>,
    /// Mean of every valid answer to every item, pooled. 0 with no answers.
    pub overall_score: f64,
}

/// Mann-Whitney comparison of two subgroups on the outcome item.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SubgroupPairwise {
    pub subgroup1: String,
    pub subgroup2: String,
    pub item: String,
    /// Outcome mean of `subgroup1` minus that of `subgroup2`.
    pub difference: f64,
    pub effect_size: f64,
    pub p_value: f64,
    pub n1: usize,
    pub n2: usize,
}

/// Output of [`analyze_subgroups`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SubgroupReport {
    /// Qualifying subgroups, highest overall score first.
    pub by_subgroup: Vec<SubgroupSummary>,
    /// One entry per pair of qualifying subgroups with enough outcome answers,
    /// in order of first appearance.
    pub pairwise_comparisons: Vec<SubgroupPairwise>,
    pub min_n: usize,
}

/// The subgroup a respondent belongs to under `key`.
///
/// A missing or blank text answer gives [`UNKNOWN`]; numeric codes are used
/// as written.
pub fn subgroup_of(record: &Record, key: &str) -> String {
    match record.get(key) {
        Some(Answer::Text(label)) if !label.trim().is_empty() => label.clone(),
        Some(Answer::Number(code)) => code.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// Respondents per answer to `key`, in order of first appearance.
pub fn count_by(records: &[Record], key: &str) -> Vec<SubgroupCount> {
    partition(records, key)
        .into_iter()
        .map(|(subgroup, members)| SubgroupCount {
            subgroup,
            n: members.len(),
        })
        .collect()
}

/// Split `records` by the plan's key, then summarize and compare subgroups.
///
/// Subgroups smaller than `min_n`, [`UNKNOWN`] and the plan's excluded
/// answers are dropped before anything is computed. A pair is compared only
/// when both sides have at least `min_n` valid outcome answers.
pub fn analyze_subgroups(plan: &SubgroupPlan, records: &[Record]) -> SubgroupReport {
    let qualifying: Vec<(String, Vec<&Record>)> = partition(records, &plan.key)
        .into_iter()
        .filter(|(label, members)| {
            if plan.is_excluded(label) {
                return false;
            }
            if members.len() < plan.min_n {
                log::debug!(
                    "subgroups: dropping '{label}' ({} < {} respondents)",
                    members.len(),
                    plan.min_n
                );
                return false;
            }
            true
        })
        .collect();

    let mut by_subgroup: Vec<SubgroupSummary> = qualifying
        .iter()
        .map(|(label, members)| summarize(label, members, &plan.items))
        .collect();
    by_subgroup.sort_by(|a, b| b.overall_score.total_cmp(&a.overall_score));

    let pairwise_comparisons = match &plan.outcome {
        Some(outcome) => pairwise(&qualifying, outcome, plan.min_n),
        None => Vec::new(),
    };

    SubgroupReport {
        by_subgroup,
        pairwise_comparisons,
        min_n: plan.min_n,
    }
}

fn partition<'a>(records: &'a [Record], key: &str) -> Vec<(String, Vec<&'a Record>)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<&Record>)> = Vec::new();
    for record in records {
        let label = subgroup_of(record, key);
        match index.get(&label) {
            Some(&i) => groups[i].1.push(record),
            None => {
                index.insert(label.clone(), groups.len());
                groups.push((label, vec![record]));
            }
        }
    }
    groups
}

fn member_answers(members: &[&Record], key: &str) -> Vec<Option<f64>> {
    members.iter().map(|r| answer(r, key)).collect()
}

fn summarize(label: &str, members: &[&Record], items: &[SubgroupItem]) -> SubgroupSummary {
    let mut pooled = Vec::new();
    let items = items
        .iter()
        .map(|item| {
            let answers = member_answers(members, &item.key);
            pooled.extend(valid(&answers));
            ItemStats {
                name: item.name.clone(),
                stats: describe(&answers),
            }
        })
        .collect();
    SubgroupSummary {
        subgroup: label.to_string(),
        n: members.len(),
        items,
        overall_score: mean_of(&pooled),
    }
}

fn pairwise(
    qualifying: &[(String, Vec<&Record>)],
    outcome: &SubgroupItem,
    min_n: usize,
) -> Vec<SubgroupPairwise> {
    let outcomes: Vec<Vec<f64>> = qualifying
        .iter()
        .map(|(_, members)| valid(&member_answers(members, &outcome.key)))
        .collect();

    let mut comparisons = Vec::new();
    for i in 0..qualifying.len() {
        for j in i + 1..qualifying.len() {
            let (a, b) = (&outcomes[i], &outcomes[j]);
            if a.len() < min_n || b.len() < min_n {
                continue;
            }
            let mw = mann_whitney_u(a, b);
            comparisons.push(SubgroupPairwise {
                subgroup1: qualifying[i].0.clone(),
                subgroup2: qualifying[j].0.clone(),
                item: outcome.name.clone(),
                difference: mean_of(a) - mean_of(b),
                effect_size: mw.effect_size,
                p_value: mw.p_value,
                n1: a.len(),
                n2: b.len(),
            });
        }
    }
    comparisons
}
