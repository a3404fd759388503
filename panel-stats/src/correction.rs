//! Multiple testing correction.
//!
//! When every survey item is tested at once, raw p-values overstate the
//! evidence. [`benjamini_hochberg`] controls the false discovery rate across
//! the whole collection of comparisons.

use panel_core::{Annotated, Scored};

/// One raw p-value to be corrected, keyed by variable name.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PValueEntry {
    /// Variable the test was run on.
    pub variable: String,
    /// Raw p-value.
    pub p_value: f64,
}

impl PValueEntry {
    pub fn new(variable: impl Into<String>, p_value: f64) -> Self {
        Self {
            variable: variable.into(),
            p_value,
        }
    }
}

/// Corrected outcome for one variable.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MultipleComparisonResult {
    /// Variable the test was run on.
    pub variable: String,
    /// Raw p-value.
    pub p_value: f64,
    /// Benjamini-Hochberg adjusted p-value, capped at 1.
    pub adjusted_p_value: f64,
    /// Whether the variable falls at or below the step-up cutoff rank.
    pub significant: bool,
}

impl Scored for MultipleComparisonResult {
    fn score(&self) -> f64 {
        self.adjusted_p_value
    }
}

impl Annotated for MultipleComparisonResult {
    fn name(&self) -> &str {
        &self.variable
    }
}

/// Benjamini-Hochberg step-up procedure at false discovery rate `alpha`.
///
/// Entries are sorted ascending by p-value (ties keep input order). With `m`
/// entries, the cutoff is the largest 1-based rank `k` such that
/// `p(k) <= k / m · alpha`, and *every* entry ranked at or below `k` is
/// significant, even one whose own p-value exceeds its own threshold.
///
/// Adjusted p-values are built back to front: the largest keeps its raw
/// value, and each earlier one is `min(p(i) · m / i, adjusted(i + 1), 1)`.
///
/// The output has one record per input entry, ordered ascending by raw
/// p-value. Empty input gives empty output.
///
/// ```
/// use panel_stats::correction::{benjamini_hochberg, PValueEntry};
///
/// let out = benjamini_hochberg(&[PValueEntry::new("x", 0.01)], 0.05);
/// assert!(out[0].significant);
/// assert_eq!(out[0].adjusted_p_value, 0.01);
/// ```
pub fn benjamini_hochberg(results: &[PValueEntry], alpha: f64) -> Vec<MultipleComparisonResult> {
    let m = results.len();
    if m == 0 {
        return Vec::new();
    }

    let mut sorted: Vec<&PValueEntry> = results.iter().collect();
    sorted.sort_by(|a, b| a.p_value.total_cmp(&b.p_value));
    let p: Vec<f64> = sorted.iter().map(|e| e.p_value).collect();

    let cutoff = step_up_cutoff(&p, alpha);
    let adjusted = adjust_sorted(&p);

    sorted
        .into_iter()
        .zip(adjusted)
        .enumerate()
        .map(|(i, (entry, adj))| MultipleComparisonResult {
            variable: entry.variable.clone(),
            p_value: entry.p_value,
            adjusted_p_value: adj,
            significant: i < cutoff,
        })
        .collect()
}

/// Benjamini-Hochberg adjusted p-values returned in input order.
///
/// Same recurrence as [`benjamini_hochberg`], for callers holding a bare
/// array of p-values.
pub fn adjusted_p_values(p_values: &[f64]) -> Vec<f64> {
    let n = p_values.len();
    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&a, &b| p_values[a].total_cmp(&p_values[b]));

    let sorted: Vec<f64> = indices.iter().map(|&i| p_values[i]).collect();
    let mut out = vec![0.0; n];
    for (&idx, adj) in indices.iter().zip(adjust_sorted(&sorted)) {
        out[idx] = adj;
    }
    out
}

/// Largest 1-based rank `k` with `p(k) <= k / m · alpha`, or 0 if none.
fn step_up_cutoff(sorted: &[f64], alpha: f64) -> usize {
    let m = sorted.len() as f64;
    sorted
        .iter()
        .enumerate()
        .filter(|&(i, &p)| p <= (i + 1) as f64 / m * alpha)
        .map(|(i, _)| i + 1)
        .last()
        .unwrap_or(0)
}

fn adjust_sorted(sorted: &[f64]) -> Vec<f64> {
    let m = sorted.len();
    if m == 0 {
        return Vec::new();
    }
    let m_f = m as f64;
    let mut adjusted = vec![0.0; m];
    adjusted[m - 1] = sorted[m - 1];
    for i in (0..m - 1).rev() {
        let raw = sorted[i] * (m_f / (i + 1) as f64);
        adjusted[i] = raw.min(adjusted[i + 1]).min(1.0);
    }
    adjusted
}

// ── Tests ──────────────────────────────────────────────────────────────────
