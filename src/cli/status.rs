//! The `status` command: report persisted iteration state.
//!
//! Without a requirements source this shows the working-directory layout and
//! the stored ordinal. With one, the candidate matrix is re-expanded so the
//! total combination count and a progress estimate can be derived - that
//! expansion queries the package index exactly like `resolve` does.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::Path;

use crate::candidates::CandidateSet;
use crate::config::Config;
use crate::requirements;
use crate::resolver::state::IterationStateStore;
use crate::resolver::{odometer, progress_percent};

/// Show persisted iteration state and working-directory layout.
#[derive(Args)]
pub struct StatusCommand {
    /// Optional requirements source; when given, the total combination
    /// count and progress estimate are computed
    source: Option<String>,
}

impl StatusCommand {
    pub async fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let config = Config::load(config_path)?;
        let store = IterationStateStore::new(config.state_file());

        println!("Working directory: {}", config.work_dir.display());
        println!("State file:        {}", store.path().display());

        if !store.path().exists() {
            println!("{}", "No persisted iteration state; next run starts fresh.".yellow());
            return Ok(());
        }

        let ordinal = store.read()?;
        println!("Attempts completed: {ordinal}");
        println!("Next attempt:       #{}", ordinal + 1);

        if let Some(source) = &self.source {
            let raw = requirements::source::load(source).await?;
            let parsed = requirements::parse(&raw)?;
            let candidates =
                CandidateSet::expand(&parsed, &config.python, config.versions_per_package).await?;

            match odometer::total_combinations(&candidates.max_indices()) {
                Some(total) => {
                    println!("Total combinations: {total}");
                    if let Some(percent) = progress_percent(ordinal, Some(total)) {
                        println!("Progress:           {percent:.2}%");
                    }
                }
                None => println!("Total combinations: too large to compute"),
            }
        }

        Ok(())
    }
}
