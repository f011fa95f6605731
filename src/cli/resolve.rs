//! The `resolve` command: run the matrix search to a terminal outcome.
//!
//! Loads and validates the requirements source, expands it into the
//! candidate matrix, then drives the resolver until one combination
//! compiles, the space is exhausted, or the operator interrupts with
//! Ctrl-C. Ctrl-C maps to a cooperative stop: the in-flight pip-compile
//! attempt finishes and the persisted ordinal stays valid, so re-running
//! the same command resumes the search.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::candidates::CandidateSet;
use crate::config::Config;
use crate::constants::MAX_MEANINGFUL_TOTAL;
use crate::requirements;
use crate::resolver::{Resolver, ResolverEvent, RunOutcome, odometer, state::IterationStateStore};
use crate::utils::progress::ProgressBar;

/// Run the matrix resolution until a combination compiles.
#[derive(Args)]
pub struct ResolveCommand {
    /// Requirements source: a local file path or an HTTP(S) URL
    source: String,

    /// How many of the most recent versions to try per unpinned package
    #[arg(long, value_name = "N")]
    versions: Option<usize>,

    /// Working directory for state, constraint, and output files
    #[arg(long, value_name = "DIR")]
    work_dir: Option<PathBuf>,

    /// Discard persisted iteration state and start from the first combination
    #[arg(long)]
    fresh: bool,
}

impl ResolveCommand {
    pub async fn execute(self, config_path: Option<&Path>, quiet: bool) -> Result<()> {
        let mut config = Config::load(config_path)?;
        if let Some(versions) = self.versions {
            config.versions_per_package = versions;
        }
        if let Some(work_dir) = self.work_dir {
            config.work_dir = work_dir;
        }

        let raw = requirements::source::load(&self.source).await?;
        if let Err(errors) = requirements::validate_lines(&raw) {
            for error in &errors {
                eprintln!("{} {error}", "✗".red());
            }
            bail!("requirements validation failed ({} error(s))", errors.len());
        }
        let parsed = requirements::parse(&raw)?;

        let spinner = ProgressBar::new_spinner();
        spinner.set_message(format!("Expanding candidates for {} packages...", parsed.len()));
        let candidates =
            CandidateSet::expand(&parsed, &config.python, config.versions_per_package).await?;
        spinner.finish_and_clear();

        if self.fresh {
            let store = IterationStateStore::new(config.state_file());
            if let Some(previous) = store.clear()? {
                println!("Discarded iteration state (was at ordinal {previous}).");
            }
        }

        let total = odometer::total_combinations(&candidates.max_indices());
        let progress = match total {
            Some(t) if t <= MAX_MEANINGFUL_TOTAL => ProgressBar::new(t as u64),
            _ => ProgressBar::new_spinner(),
        };

        let (mut resolver, handle, mut events) = Resolver::new(config, candidates);

        let ctrl_c_handle = handle.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                ctrl_c_handle.stop();
            }
        });

        let run = tokio::spawn(async move { resolver.run().await });

        while let Some(event) = events.recv().await {
            match event {
                ResolverEvent::LogMessage(line) => {
                    if !quiet {
                        progress.println(&line);
                    }
                }
                ResolverEvent::ProgressChanged { attempts, percent, .. } => {
                    progress.set_position(attempts);
                    if let Some(percent) = percent {
                        progress.set_message(format!("{percent:.2}% of matrix tried"));
                    } else {
                        progress.set_message(format!("{attempts} combinations tried"));
                    }
                }
                ResolverEvent::SuccessCompiled(_) | ResolverEvent::StateChanged(_) => {}
            }
        }
        progress.finish_and_clear();

        match run.await?? {
            RunOutcome::Succeeded(path) => {
                println!("{} Resolved lock written to {}", "✓".green(), path.display());
                Ok(())
            }
            RunOutcome::Stopped => {
                println!("Stopped. Re-run the same command to resume.");
                Ok(())
            }
            RunOutcome::Exhausted => {
                bail!("no viable combination found: the candidate matrix is exhausted")
            }
        }
    }
}
