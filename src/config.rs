//! Configuration management for the catalog checker.
//!
//! Handles:
//! - Command-line argument parsing
//! - Rule file discovery
//! - Resource sanity limits

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::rules::RuleSet;

/// Catalog location used when none is given
pub const DEFAULT_CATALOG_PATH: &str = "gradle/libs.versions.toml";

/// Output format of the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Errors, then warnings, then a summary line
    #[default]
    Text,
    /// The serialized validation result
    Json,
}

/// Command-line arguments for the catalog checker
#[derive(Debug, Parser)]
#[command(name = "catalog-check")]
#[command(about = "Validate a dependency version catalog")]
#[command(version)]
pub struct Args {
    /// Catalog file to validate
    #[arg(default_value = DEFAULT_CATALOG_PATH)]
    pub path: PathBuf,

    /// Additional rule files merged over the built-in rules
    #[arg(long = "rules", value_name = "FILE", help = "Extra rule file (TOML), may be repeated")]
    pub rules: Vec<PathBuf>,

    /// Skip the rule file in the user config directory
    #[arg(long)]
    pub no_user_rules: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Entry count above which a sanity warning is emitted
    #[arg(long)]
    pub max_entries: Option<usize>,

    /// Log level for diagnostics on stderr
    #[arg(
        long,
        default_value = "warn",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// Resource sanity limits; exceeding them produces warnings only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_file_bytes: u64,
    pub max_entries: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_file_bytes: 1024 * 1024,
            max_entries: 2000,
        }
    }
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    pub catalog_path: PathBuf,
    /// Rule files to merge, in order
    pub rule_files: Vec<PathBuf>,
    pub format: OutputFormat,
    pub limits: Limits,
    pub log_level: String,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments (useful for testing)
    pub fn from_args(args: Args) -> Result<Self> {
        let mut rule_files = Vec::new();

        // User rules first so explicit --rules files are merged last
        if !args.no_user_rules {
            if let Some(user_rules) = user_rules_path().filter(|path| path.is_file()) {
                rule_files.push(user_rules);
            }
        }
        rule_files.extend(args.rules);

        let mut limits = Limits::default();
        if let Some(max_entries) = args.max_entries {
            limits.max_entries = max_entries;
        }

        Ok(Config {
            catalog_path: args.path,
            rule_files,
            format: args.format,
            limits,
            log_level: args.log_level,
        })
    }

    /// Built-in rules with every configured rule file merged in
    pub fn build_rule_set(&self) -> Result<RuleSet> {
        let mut rules = RuleSet::with_defaults();
        for path in &self.rule_files {
            rules.load_file(path)?;
        }
        Ok(rules)
    }
}

/// `<config dir>/catalog-check/rules.toml`
pub fn user_rules_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("catalog-check").join("rules.toml"))
}
