//! The `reset` command: discard persisted iteration state.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::Path;

use crate::config::Config;
use crate::resolver::state::IterationStateStore;

/// Discard persisted iteration state so the next run starts fresh.
///
/// Only the iteration-state file is removed; constraint files, logs, and
/// previously compiled outputs in the working directory are left in place.
#[derive(Args)]
pub struct ResetCommand {}

impl ResetCommand {
    pub async fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let config = Config::load(config_path)?;
        let store = IterationStateStore::new(config.state_file());

        match store.clear()? {
            Some(previous) => {
                println!(
                    "{} Removed {} (was at ordinal {previous})",
                    "✓".green(),
                    store.path().display()
                );
            }
            None => {
                println!("No iteration state to remove at {}", store.path().display());
            }
        }
        Ok(())
    }
}
