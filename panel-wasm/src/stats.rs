//! Statistics wrappers with JSON input/output.
//!
//! Sample arguments are JSON arrays of numbers where `null` marks a missing
//! answer. Result types from `panel-stats` serialize directly; only the
//! plain-language readings get a `Js*` wrapper carrying display text.

use std::collections::HashMap;

use panel_core::{PanelError, Result};
use panel_stats::analysis::{self, AnalysisPlan, Answer, Record};
use panel_stats::bootstrap::{bootstrap_mean_difference_ci_seeded, BootstrapConfig};
use panel_stats::comparison::{calculate_composite_index, run_group_comparison};
use panel_stats::correction::{self, PValueEntry};
use panel_stats::correlation::spearman_correlation;
use panel_stats::descriptive;
use panel_stats::effect_size::{self, ClesInterpretation, EffectMagnitude};
use panel_stats::testing::{mann_whitney_u_with, MannWhitneyOptions};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_json::Value;

use crate::error::{parse_json, wasm_ok, wasm_result};

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

// ── Wrapper types ────────────────────────────────────────────────────────

/// Magnitude label for a correlation-type effect size.
#[derive(Debug, Serialize)]
pub struct JsEffectReading {
    pub magnitude: EffectMagnitude,
    pub text: String,
}

impl From<EffectMagnitude> for JsEffectReading {
    fn from(m: EffectMagnitude) -> Self {
        Self {
            magnitude: m,
            text: m.to_string(),
        }
    }
}

/// CLES reading plus its sentence.
#[derive(Debug, Serialize)]
pub struct JsClesReading {
    #[serde(flatten)]
    pub reading: ClesInterpretation,
    pub text: String,
}

impl From<ClesInterpretation> for JsClesReading {
    fn from(reading: ClesInterpretation) -> Self {
        Self {
            reading,
            text: reading.to_string(),
        }
    }
}

// ── Parsing helpers ──────────────────────────────────────────────────────

fn parse_sample(what: &str, json: &str) -> Result<Vec<Option<f64>>> {
    parse_json(what, json)
}

fn parse_pair(x_json: &str, y_json: &str) -> Result<(Vec<Option<f64>>, Vec<Option<f64>>)> {
    Ok((parse_sample("x", x_json)?, parse_sample("y", y_json)?))
}

/// Respondent records as JSON objects. Numbers and strings are kept; nulls,
/// booleans and nested values are dropped.
fn parse_records(what: &str, json: &str) -> Result<Vec<Record>> {
    let raw: Vec<HashMap<String, Value>> = parse_json(what, json)?;
    Ok(raw
        .into_iter()
        .map(|answers| {
            answers
                .into_iter()
                .filter_map(|(key, value)| {
                    let answer = match value {
                        Value::Number(n) => Answer::Number(n.as_f64()?),
                        Value::String(s) => Answer::Text(s),
                        _ => return None,
                    };
                    Some((key, answer))
                })
                .collect()
        })
        .collect())
}

fn check_alpha(alpha: f64) -> Result<()> {
    if alpha > 0.0 && alpha < 1.0 {
        Ok(())
    } else {
        Err(PanelError::InvalidInput(format!(
            "alpha must be in (0, 1), got {alpha}"
        )))
    }
}

// ── JSON boundary functions ──────────────────────────────────────────────

/// Descriptive statistics of a JSON array.
///
/// Input: `"[7, 8, null, 6]"`. Output: JSON `DescriptiveStats`.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn describe(data_json: &str) -> String {
    wasm_result(parse_sample("data", data_json).map(|d| descriptive::describe(&d)))
}

/// Mann-Whitney U test between two JSON arrays.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn mann_whitney_u(x_json: &str, y_json: &str, tie_correction: bool) -> String {
    let options = MannWhitneyOptions { tie_correction };
    wasm_result(parse_pair(x_json, y_json).map(|(x, y)| mann_whitney_u_with(&x, &y, &options)))
}

/// Hedges' g between two JSON arrays.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn hedges_g(x_json: &str, y_json: &str) -> String {
    wasm_result(parse_pair(x_json, y_json).map(|(x, y)| effect_size::hedges_g(&x, &y)))
}

/// Common language effect size between two JSON arrays.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn cles(x_json: &str, y_json: &str) -> String {
    wasm_result(
        parse_pair(x_json, y_json).map(|(x, y)| effect_size::common_language_effect_size(&x, &y)),
    )
}

/// Percentile-bootstrap CI for `mean(x) - mean(y)` with a fixed seed.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn bootstrap_ci(
    x_json: &str,
    y_json: &str,
    n_bootstrap: usize,
    alpha: f64,
    seed: u64,
) -> String {
    let result = parse_pair(x_json, y_json).and_then(|(x, y)| {
        let config = BootstrapConfig::new(n_bootstrap, alpha)?;
        Ok(bootstrap_mean_difference_ci_seeded(&x, &y, &config, seed))
    });
    wasm_result(result)
}

/// Spearman rank correlation between two JSON arrays, paired by index.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn spearman(x_json: &str, y_json: &str) -> String {
    wasm_result(parse_pair(x_json, y_json).map(|(x, y)| spearman_correlation(&x, &y)))
}

/// Benjamini-Hochberg over `[{"variable": .., "pValue": ..}, ..]`.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn benjamini_hochberg(entries_json: &str, alpha: f64) -> String {
    let result = check_alpha(alpha)
        .and_then(|()| parse_json::<Vec<PValueEntry>>("entries", entries_json))
        .map(|entries| correction::benjamini_hochberg(&entries, alpha));
    wasm_result(result)
}

/// Full comparison of one variable with the default bootstrap settings.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn group_comparison(
    group_json: &str,
    independent_json: &str,
    variable: &str,
    theme: &str,
    seed: u64,
) -> String {
    let result = parse_sample("group", group_json).and_then(|group| {
        let independent = parse_sample("independent", independent_json)?;
        let mut rng = StdRng::seed_from_u64(seed);
        Ok(run_group_comparison(
            &group,
            &independent,
            variable,
            theme,
            &BootstrapConfig::default(),
            &mut rng,
        ))
    });
    wasm_result(result)
}

/// Composite index from per-respondent composite scores.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn composite_index(
    group_scores_json: &str,
    independent_scores_json: &str,
    name: &str,
    components_json: &str,
) -> String {
    let result = parse_sample("group", group_scores_json).and_then(|group| {
        let independent = parse_sample("independent", independent_scores_json)?;
        let components: Vec<String> = parse_json("components", components_json)?;
        Ok(calculate_composite_index(&group, &independent, name, &components))
    });
    wasm_result(result)
}

/// Run an analysis plan over two arrays of respondent records.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn analyze(
    plan_json: &str,
    group_records_json: &str,
    independent_records_json: &str,
) -> String {
    let result = parse_json::<AnalysisPlan>("plan", plan_json).and_then(|plan| {
        let group = parse_records("group records", group_records_json)?;
        let independent = parse_records("independent records", independent_records_json)?;
        analysis::analyze(&plan, &group, &independent)
    });
    wasm_result(result)
}

/// Magnitude label for a rank-biserial or Spearman coefficient.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn interpret_effect(r: f64) -> String {
    wasm_ok(&JsEffectReading::from(EffectMagnitude::from_correlation(r)))
}

/// Plain-language reading of a CLES value (group side first).
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn interpret_cles(cles: f64) -> String {
    wasm_ok(&JsClesReading::from(effect_size::interpret_cles(cles)))
}
