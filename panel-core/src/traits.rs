//! Core trait definitions for the panel workspace.
//!
//! These traits define the contracts that result types implement across crates.

/// A type that carries a numeric score (p-value, correlation, etc.).
pub trait Scored {
    /// The score value.
    fn score(&self) -> f64;
}

/// A type that carries a label (variable name, index name).
pub trait Annotated {
    /// A human-readable name or identifier.
    fn name(&self) -> &str;

    /// An optional description, such as the theme a variable belongs to.
    fn description(&self) -> Option<&str> {
        None
    }
}

/// A type that can produce a summary of its contents.
pub trait Summarizable {
    /// A one-line summary suitable for display.
    fn summary(&self) -> String;
}
