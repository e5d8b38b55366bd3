//! Validation Engine
//!
//! Runs the validation passes over a parsed catalog and collects findings.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Limits;
use crate::parser::{self, Document};
use crate::rules::RuleSet;
use crate::validation::passes::PASSES;

/// Outcome of validating one catalog
///
/// Append-only while the engine runs; callers receive it read-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    is_valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    timestamp: DateTime<Utc>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// A result carrying a single structural error
    pub(crate) fn fatal(message: String) -> Self {
        let mut result = Self::new();
        result.add_error(message);
        result
    }

    pub(crate) fn add_error(&mut self, message: String) {
        self.errors.push(message);
        self.is_valid = false;
    }

    pub(crate) fn add_warning(&mut self, message: String) {
        self.warnings.push(message);
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Run every validation pass over a parsed document
///
/// All passes run regardless of earlier findings.
pub fn validate_document(document: &Document, rules: &RuleSet) -> ValidationResult {
    let mut result = ValidationResult::new();

    for (name, pass) in PASSES {
        let (errors, warnings) = (result.errors.len(), result.warnings.len());
        pass(document, rules, &mut result);
        log::debug!(
            "pass '{}': {} errors, {} warnings",
            name,
            result.errors.len() - errors,
            result.warnings.len() - warnings
        );
    }

    result
}

/// Catalog validator bound to a rule set and resource limits
#[derive(Debug, Clone, Default)]
pub struct Validator {
    rules: RuleSet,
    limits: Limits,
}

impl Validator {
    pub fn new(rules: RuleSet, limits: Limits) -> Self {
        Self { rules, limits }
    }

    /// Validator using the embedded default rules
    pub fn with_defaults() -> Self {
        Self::new(RuleSet::with_defaults(), Limits::default())
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Read and validate a catalog file
    ///
    /// A missing or unreadable file yields a single error.
    pub fn validate_path(&self, path: &Path) -> ValidationResult {
        match std::fs::read_to_string(path) {
            Ok(content) => self.validate_content(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                ValidationResult::fatal(format!("Catalog file not found: {}", path.display()))
            }
            Err(e) => ValidationResult::fatal(format!(
                "Failed to read catalog file {}: {}",
                path.display(),
                e
            )),
        }
    }

    /// Parse and validate catalog text
    ///
    /// Parse failures abort with a single error; no pass runs.
    pub fn validate_content(&self, content: &str) -> ValidationResult {
        let document = match parser::parse(content) {
            Ok(document) => document,
            Err(e) => {
                log::debug!("catalog rejected by parser: {}", e);
                return ValidationResult::fatal(format!("Failed to parse catalog: {}", e));
            }
        };

        let mut result = validate_document(&document, &self.rules);
        self.check_limits(content.len(), &document, &mut result);
        result
    }

    fn check_limits(&self, bytes: usize, document: &Document, result: &mut ValidationResult) {
        if bytes as u64 > self.limits.max_file_bytes {
            result.add_warning(format!(
                "Catalog is {} bytes, larger than the expected maximum of {} bytes",
                bytes, self.limits.max_file_bytes
            ));
        }

        let entries = document.entry_count();
        if entries > self.limits.max_entries {
            result.add_warning(format!(
                "Catalog has {} entries, more than the expected maximum of {}",
                entries, self.limits.max_entries
            ));
        }
    }
}

/// Validate a catalog file with the default rules
pub fn validate(path: impl AsRef<Path>) -> ValidationResult {
    Validator::with_defaults().validate_path(path.as_ref())
}

/// Validate catalog text with the default rules
pub fn validate_str(content: &str) -> ValidationResult {
    Validator::with_defaults().validate_content(content)
}
