//! Command-line front end
//!
//! Validates one catalog and prints the report. The exit code is non-zero
//! when the catalog is invalid so build steps and hooks can gate on it.

use std::process::ExitCode;

use anyhow::Result;

use crate::config::{Config, OutputFormat};
use crate::validation::{ValidationResult, Validator};

/// Run the checker with arguments from the command line
pub fn run() -> Result<ExitCode> {
    let config = Config::from_args_and_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    let rules = config.build_rule_set()?;
    let validator = Validator::new(rules, config.limits);

    log::info!("Validating {}", config.catalog_path.display());
    let result = validator.validate_path(&config.catalog_path);

    print!("{}", render(&result, config.format)?);

    Ok(if result.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Format a result for output
pub fn render(result: &ValidationResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)? + "\n"),
        OutputFormat::Text => Ok(render_text(result)),
    }
}

fn render_text(result: &ValidationResult) -> String {
    let mut out = String::new();

    for error in result.errors() {
        out.push_str(&format!("error: {}\n", error));
    }
    for warning in result.warnings() {
        out.push_str(&format!("warning: {}\n", warning));
    }

    let status = if result.is_valid() { "valid" } else { "invalid" };
    out.push_str(&format!(
        "catalog is {}: {} error(s), {} warning(s)\n",
        status,
        result.errors().len(),
        result.warnings().len()
    ));
    out
}
