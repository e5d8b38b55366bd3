use std::process::ExitCode;

use anyhow::Result;
use version_catalog_validator::cli::run;

fn main() -> Result<ExitCode> {
    run()
}
