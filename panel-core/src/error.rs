//! Structured error types for the panel workspace.
//!
//! Statistical routines degrade to neutral values instead of failing; these
//! errors only surface at configuration and serialization boundaries.

use thiserror::Error;

/// Unified error type for all panel operations.
#[derive(Debug, Error)]
pub enum PanelError {
    /// Invalid input (bad configuration, out-of-range parameters)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Parse error (malformed JSON or records at a boundary)
    #[error("parse error: {0}")]
    Parse(String),
}

/// Convenience alias used throughout the panel workspace.
pub type Result<T> = std::result::Result<T, PanelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes() {
        let e = PanelError::InvalidInput("alpha must be in (0, 1)".into());
        assert_eq!(e.to_string(), "invalid input: alpha must be in (0, 1)");
        let e = PanelError::Parse("expected array".into());
        assert_eq!(e.to_string(), "parse error: expected array");
    }

    #[test]
    fn question_mark_propagates() {
        fn inner() -> Result<()> {
            Err(PanelError::InvalidInput("bad".into()))
        }
        fn outer() -> Result<u32> {
            inner()?;
            Ok(1)
        }
        assert!(matches!(outer(), Err(PanelError::InvalidInput(_))));
    }
}
