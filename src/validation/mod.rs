//! Validation Engine
//!
//! Runs the catalog validation passes and aggregates their findings.

pub mod engine;
pub mod passes;

pub use engine::{ValidationResult, Validator, validate, validate_document, validate_str};
pub use passes::{PASSES, Pass};
