//! The `validate` command: check a requirements source line by line.
//!
//! Runs the same per-line validation the resolver applies before a run,
//! without querying any package index. Exits nonzero when any line fails,
//! printing one error per offending line.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;

use crate::requirements;

/// Validate a requirements file or URL without resolving anything.
#[derive(Args)]
pub struct ValidateCommand {
    /// Requirements source: a local file path or an HTTP(S) URL
    source: String,
}

impl ValidateCommand {
    pub async fn execute(self) -> Result<()> {
        let raw = requirements::source::load(&self.source).await?;

        match requirements::validate_lines(&raw) {
            Ok(()) => {
                let count = requirements::strip_lines(&raw).len();
                println!("{} {count} requirement(s), all lines valid", "✓".green());
                Ok(())
            }
            Err(errors) => {
                for error in &errors {
                    eprintln!("{} {error}", "✗".red());
                }
                bail!("requirements validation failed ({} error(s))", errors.len())
            }
        }
    }
}
