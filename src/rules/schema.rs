//! Rule File Schema
//!
//! Serde types for curated rule files. A rule file is plain TOML:
//!
//! ```toml
//! [[compatibility]]
//! name = "AGP/Kotlin"
//! when = { key = "agp", prefix = "8." }
//! conflicts_with = { key = "kotlin", prefix = "1.8" }
//!
//! [[vulnerabilities]]
//! module = "junit:junit"
//! versions = ["4.11", "4.12"]
//!
//! [critical]
//! modules = ["junit"]
//! ```

use serde::Deserialize;

use crate::catalog::VERSIONS;
use crate::parser::{Document, Value};

/// Root rule file structure (matches TOML)
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuleFile {
    pub compatibility: Vec<CompatibilityRule>,
    pub vulnerabilities: Vec<VulnerableModule>,
    pub critical: Option<CriticalDependencies>,
}

/// A pairwise rule: two versions that must not be combined
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CompatibilityRule {
    pub name: String,
    pub when: VersionCondition,
    pub conflicts_with: VersionCondition,
    pub message: Option<String>,
}

/// Matches a `[versions]` entry whose value starts with a prefix
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct VersionCondition {
    pub key: String,
    pub prefix: String,
}

impl VersionCondition {
    /// The matching version string, if the condition holds for the document
    pub fn matched<'a>(&self, document: &'a Document) -> Option<&'a str> {
        match document.section(VERSIONS)?.get(&self.key)? {
            Value::Str(version) if version.starts_with(&self.prefix) => Some(version),
            _ => None,
        }
    }
}

impl CompatibilityRule {
    /// Both matched versions when the rule fires
    pub fn violation<'a>(&self, document: &'a Document) -> Option<(&'a str, &'a str)> {
        Some((
            self.when.matched(document)?,
            self.conflicts_with.matched(document)?,
        ))
    }
}

/// Versions of one module with a known advisory
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct VulnerableModule {
    pub module: String,
    pub versions: Vec<String>,
    pub advisory: Option<String>,
}

impl VulnerableModule {
    pub fn is_vulnerable(&self, version: &str) -> bool {
        self.versions.iter().any(|v| v == version)
    }
}

/// Module substrings a catalog is expected to contain
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct CriticalDependencies {
    pub modules: Vec<String>,
    pub trigger: Trigger,
}

/// When the critical-dependency check applies; empty means always
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Trigger {
    /// Any of these `[versions]` keys present
    pub versions: Vec<String>,
    /// Any library module containing one of these substrings
    pub modules: Vec<String>,
}

impl Trigger {
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty() && self.modules.is_empty()
    }
}
