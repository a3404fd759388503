//! Shared primitives for the panel statistics workspace.
//!
//! `panel-core` holds the pieces every other panel crate builds on:
//!
//! - **Error types**: [`PanelError`] and [`Result`] for configuration and boundary failures
//! - **Traits**: Small display/inspection abstractions like [`Summarizable`],
//!   [`Scored`], [`Annotated`]

pub mod error;
pub mod traits;

pub use error::{PanelError, Result};
pub use traits::*;
