//! Rule Set
//!
//! In-memory collection of curated rules, built from the embedded defaults
//! and any rule files merged on top.

use super::schema::{CompatibilityRule, CriticalDependencies, RuleFile, VersionCondition, VulnerableModule};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Rules consulted by the validation passes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    compatibility: Vec<CompatibilityRule>,
    vulnerabilities: BTreeMap<String, VulnerableModule>,
    critical: CriticalDependencies,
}

impl RuleSet {
    /// An empty rule set; passes 7, 8 and 10 find nothing with it
    pub fn new() -> Self {
        Self::default()
    }

    /// The embedded default rules
    pub fn with_defaults() -> Self {
        let mut rules = Self::new();
        rules.add_embedded_defaults();
        rules
    }

    /// Merge the embedded default rule file
    pub fn add_embedded_defaults(&mut self) {
        let embedded_toml = include_str!("../../resources/rules/default.catalog-rules.toml");

        match toml::from_str::<RuleFile>(embedded_toml) {
            Ok(file) => self.merge(file),
            Err(e) => {
                log::warn!(
                    "Failed to parse embedded default rules: {}. Using minimal fallback.",
                    e
                );
                self.add_minimal_defaults();
            }
        }
    }

    /// Minimal fallback in case the embedded TOML fails to parse
    fn add_minimal_defaults(&mut self) {
        self.compatibility.push(CompatibilityRule {
            name: "AGP/Kotlin".to_string(),
            when: VersionCondition {
                key: "agp".to_string(),
                prefix: "8.".to_string(),
            },
            conflicts_with: VersionCondition {
                key: "kotlin".to_string(),
                prefix: "1.8".to_string(),
            },
            message: None,
        });

        self.merge(RuleFile {
            vulnerabilities: vec![VulnerableModule {
                module: "junit:junit".to_string(),
                versions: vec!["4.11".to_string(), "4.12".to_string()],
                advisory: None,
            }],
            ..RuleFile::default()
        });
    }

    /// Load a TOML rule file from disk and merge it
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rule file {}", path.display()))?;
        let file: RuleFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse rule file {}", path.display()))?;

        log::info!(
            "Loaded rule file {}: {} compatibility rules, {} vulnerable modules",
            path.display(),
            file.compatibility.len(),
            file.vulnerabilities.len()
        );

        self.merge(file);
        Ok(())
    }

    /// Add the rules of a file to this set
    ///
    /// Compatibility rules append. Vulnerable versions of the same module
    /// are unioned; a later advisory replaces an earlier one. Critical
    /// modules and triggers append without duplicates.
    pub fn merge(&mut self, file: RuleFile) {
        self.compatibility.extend(file.compatibility);

        for vulnerable in file.vulnerabilities {
            match self.vulnerabilities.get_mut(&vulnerable.module) {
                Some(existing) => {
                    extend_unique(&mut existing.versions, vulnerable.versions);
                    if vulnerable.advisory.is_some() {
                        existing.advisory = vulnerable.advisory;
                    }
                }
                None => {
                    self.vulnerabilities
                        .insert(vulnerable.module.clone(), vulnerable);
                }
            }
        }

        if let Some(critical) = file.critical {
            extend_unique(&mut self.critical.modules, critical.modules);
            extend_unique(&mut self.critical.trigger.versions, critical.trigger.versions);
            extend_unique(&mut self.critical.trigger.modules, critical.trigger.modules);
        }
    }

    pub fn compatibility_rules(&self) -> &[CompatibilityRule] {
        &self.compatibility
    }

    /// Advisory entry for a `group:artifact` coordinate
    pub fn vulnerable_module(&self, module: &str) -> Option<&VulnerableModule> {
        self.vulnerabilities.get(module)
    }

    pub fn critical(&self) -> &CriticalDependencies {
        &self.critical
    }
}

fn extend_unique(target: &mut Vec<String>, items: Vec<String>) {
    for item in items {
        if !target.contains(&item) {
            target.push(item);
        }
    }
}
