//! Curated Rules
//!
//! Compatibility pairs, known-vulnerable versions and critical
//! dependencies, kept as data so new rules need no code changes.

pub mod registry;
pub mod schema;

pub use registry::RuleSet;
pub use schema::{
    CompatibilityRule, CriticalDependencies, RuleFile, Trigger, VersionCondition,
    VulnerableModule,
};
