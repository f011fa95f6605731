//! Global constants used throughout the pipmatrix codebase.
//!
//! This module contains timeout durations, retry parameters, default paths,
//! and other numeric constants that are used across multiple modules.
//! Defining them centrally improves maintainability and makes magic numbers
//! more discoverable.

use std::time::Duration;

/// Default number of pip-compile attempts per combination.
///
/// Each combination is handed to pip-compile up to this many times before the
/// combination is declared failed and the search advances.
pub const DEFAULT_COMPILE_RETRIES: u32 = 3;

/// Fixed delay between pip-compile retry attempts (5 seconds).
///
/// This is deliberately a flat delay rather than exponential backoff: the
/// dominant failure mode (a version conflict) does not self-resolve with
/// time. The delay exists to avoid hammering the package index between
/// attempts.
pub const COMPILE_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Hard wall-clock ceiling for a single pip-compile attempt (5 minutes).
///
/// A timed-out attempt counts as a validation failure, never as a crash of
/// the engine.
pub const COMPILE_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(300);

/// Timeout for a `pip index versions` query (60 seconds).
pub const PIP_INDEX_TIMEOUT: Duration = Duration::from_secs(60);

/// Default number of candidate versions kept per package.
///
/// Unpinned requirements expand into this many of the most recent versions
/// the index offers.
pub const DEFAULT_VERSIONS_PER_PACKAGE: usize = 3;

/// File name of the durable iteration-state file inside the working
/// directory.
pub const ITERATION_STATE_FILE: &str = "ITERATION_STATE.txt";

/// File name of the reused exact-pin constraint input file.
pub const CONSTRAINTS_FILE: &str = "constraints.in";

/// File name of the append-only pip-compile diagnostics log.
pub const COMPILE_LOG_FILE: &str = "pip-compile.log";

/// Default working directory for state, constraint, and output files.
pub const DEFAULT_WORK_DIR: &str = "pipmatrix";

/// Name of the config file searched for in the working directory.
pub const CONFIG_FILE: &str = "pipmatrix.toml";

/// Largest combination count for which a percentage estimate is still
/// meaningful.
///
/// Beyond this the search space is astronomical and progress is reported as
/// a bare attempt count instead of a percentage.
pub const MAX_MEANINGFUL_TOTAL: u128 = 1_000_000_000_000;

/// Returns the platform-appropriate default Python command.
///
/// Windows installs expose `python`; most Unix systems ship `python3`.
pub fn default_python_command() -> &'static str {
    if cfg!(windows) {
        "python"
    } else {
        "python3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_python_is_nonempty() {
        assert!(!default_python_command().is_empty());
    }

    #[test]
    fn retry_delay_is_flat_five_seconds() {
        assert_eq!(COMPILE_RETRY_DELAY, Duration::from_secs(5));
    }
}
