//! JSON boundary for the panel survey statistics engine.
//!
//! This crate wraps `panel-stats` for front-ends that talk JSON (browsers,
//! sandboxed workers, a server route handing the result to a web page).
//! Every public function accepts simple types (`&str`, `f64`, `usize`, `u64`)
//! and returns a JSON `String`:
//!
//! - Success: `{"ok": <value>}`
//! - Failure: `{"error": "<message>"}`
//!
//! With the `wasm` feature the functions are exported through `wasm-bindgen`.
//!
//! # Modules
//!
//! - [`error`]: JSON envelope and argument parsing
//! - [`stats`]: Descriptives, Mann-Whitney, effect sizes, bootstrap, BH, Spearman, analysis plans
//!
//! # Example
//!
//! ```
//! let group = "[7, 8, 6, 9, 7]";
//! let independent = "[5, 6, 4, 5, null]";
//! let json = panel_wasm::group_comparison(group, independent, "Q4", "Admin", 1);
//! let v: serde_json::Value = serde_json::from_str(&json).unwrap();
//! assert_eq!(v["ok"]["favoredGroup"], "group");
//! ```

pub mod error;
pub mod stats;

/// Crate version (set from Cargo.toml at compile time).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ── Re-exports ───────────────────────────────────────────────────────────

pub use stats::{
    analyze, benjamini_hochberg, bootstrap_ci, cles, composite_index, describe, group_comparison,
    hedges_g, interpret_cles, interpret_effect, mann_whitney_u, spearman, JsClesReading,
    JsEffectReading,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn reexports_accessible() {
        let _ = describe("[1,2,3]");
        let _ = mann_whitney_u("[1,2,3]", "[4,5,6]", false);
        let _ = hedges_g("[1,2,3]", "[4,5,6]");
        let _ = cles("[1,2,3]", "[4,5,6]");
        let _ = bootstrap_ci("[1,2,3]", "[4,5,6]", 100, 0.05, 1);
        let _ = spearman("[1,2,3]", "[1,2,3]");
        let _ = benjamini_hochberg(r#"[{"variable":"a","pValue":0.01}]"#, 0.05);
        let _ = group_comparison("[1,2,3]", "[4,5,6]", "a", "t", 1);
        let _ = composite_index("[1]", "[2]", "c", "[]");
        let _ = analyze("{}", "[]", "[]");
        let _ = interpret_effect(0.2);
        let _ = interpret_cles(0.5);
    }

    #[test]
    fn every_call_returns_an_envelope() {
        for json in [
            describe("oops"),
            analyze("{}", "[]", "[]"),
            interpret_cles(0.1),
        ] {
            let v: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert!(v.get("ok").is_some() ^ v.get("error").is_some());
        }
    }
}
