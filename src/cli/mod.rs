//! Command-line interface for pipmatrix.
//!
//! Each subcommand lives in its own module with its own argument struct and
//! an async `execute()`:
//!
//! - `resolve` - run the matrix search until success, exhaustion, or Ctrl-C
//! - `validate` - check a requirements source without touching the network
//! - `status` - show persisted iteration state and derived progress
//! - `reset` - discard persisted iteration state
//!
//! # Global Options
//!
//! All commands support:
//! - `--verbose` - debug-level log output
//! - `--quiet` - errors only
//! - `--no-progress` - disable progress bars and spinners
//! - `--config` - explicit `pipmatrix.toml` path

mod reset;
mod resolve;
mod status;
mod validate;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Runtime configuration derived from global CLI flags.
///
/// Holds what would otherwise be set directly as environment variables,
/// so tests and programmatic callers can control CLI behavior without
/// touching global state until [`apply_to_env`](Self::apply_to_env).
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter for `RUST_LOG`. `None` preserves any existing value.
    pub log_level: Option<String>,

    /// Disable progress bars and spinners (`PIPMATRIX_NO_PROGRESS`).
    pub no_progress: bool,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply this configuration to the process environment.
    ///
    /// Must be called once at startup, before the runtime spawns any other
    /// threads.
    pub fn apply_to_env(&self) {
        // Single-threaded at this point; set_var is unsafe in edition 2024.
        unsafe {
            if let Some(ref level) = self.log_level {
                if std::env::var("RUST_LOG").is_err() {
                    std::env::set_var("RUST_LOG", level);
                }
            }
            if self.no_progress {
                std::env::set_var("PIPMATRIX_NO_PROGRESS", "1");
            }
        }
    }
}

/// Top-level CLI for the matrix resolution engine.
#[derive(Parser)]
#[command(
    name = "pipmatrix",
    about = "Brute-force pip dependency matrix resolver",
    version,
    long_about = "pipmatrix enumerates combinations of candidate package versions and \
                  validates each one with pip-compile until a combination resolves, \
                  persisting its position so interrupted runs resume where they left off."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose (debug-level) output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to an explicit pipmatrix.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable progress bars and spinners
    #[arg(long, global = true)]
    no_progress: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Run the matrix resolution until a combination compiles.
    Resolve(resolve::ResolveCommand),

    /// Validate a requirements file or URL without resolving anything.
    Validate(validate::ValidateCommand),

    /// Show persisted iteration state and working-directory layout.
    Status(status::StatusCommand),

    /// Discard persisted iteration state so the next run starts fresh.
    Reset(reset::ResetCommand),
}

impl Cli {
    /// Execute the parsed command with configuration from its own flags.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("warn".to_string())
        };

        CliConfig {
            log_level,
            no_progress: self.no_progress,
        }
    }

    /// Execute with an injected configuration.
    pub async fn execute_with_config(self, cli_config: CliConfig) -> Result<()> {
        cli_config.apply_to_env();

        // Honors RUST_LOG, which apply_to_env may have just set.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_target(true)
            .try_init();

        let Self { command, config, quiet, .. } = self;
        match command {
            Commands::Resolve(cmd) => cmd.execute(config.as_deref(), quiet).await,
            Commands::Validate(cmd) => cmd.execute().await,
            Commands::Status(cmd) => cmd.execute(config.as_deref()).await,
            Commands::Reset(cmd) => cmd.execute(config.as_deref()).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_maps_to_debug_filter() {
        let cli = Cli::parse_from(["pipmatrix", "--verbose", "status"]);
        assert_eq!(cli.build_config().log_level, Some("debug".to_string()));
    }

    #[test]
    fn quiet_disables_log_filter() {
        let cli = Cli::parse_from(["pipmatrix", "--quiet", "status"]);
        let config = cli.build_config();
        assert_eq!(config.log_level, None);
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["pipmatrix", "-v", "-q", "status"]).is_err());
    }

    #[test]
    fn no_progress_flag_is_global() {
        let cli = Cli::parse_from(["pipmatrix", "resolve", "reqs.txt", "--no-progress"]);
        assert!(cli.build_config().no_progress);
    }
}
