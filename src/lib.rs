//! Version Catalog Validator
//!
//! Parses dependency version catalogs (`libs.versions.toml` style) and runs
//! a fixed set of consistency and security checks over them.
//!
//! This library provides:
//! - Catalog parsing into typed sections and values
//! - Validation passes with errors and advisory warnings
//! - Data-driven compatibility, vulnerability and critical-dependency rules
//! - Configuration and a command-line front end

pub mod catalog;
pub mod cli;
pub mod config;
pub mod parser;
pub mod rules;
pub mod validation;

// Re-exports for clean public API
pub use config::{Config, Limits};
pub use parser::{Document, ParseError, Value, parse};
pub use rules::RuleSet;
pub use validation::{ValidationResult, Validator, validate, validate_document, validate_str};
