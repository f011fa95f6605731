//! The validation step: asking pip-compile whether a combination holds.
//!
//! Each odometer combination is rendered to an exact-pin constraint file and
//! handed to the external dependency compiler (`python -m piptools compile`).
//! The compiler is treated as a black-box oracle: exit zero means the
//! combination is internally consistent and the resolved lock was written,
//! anything else means "this combination failed" - never a crash of the
//! engine.
//!
//! A failed attempt is retried up to the configured budget with a flat
//! 5-second delay between attempts (version conflicts do not self-resolve
//! with time, the delay only avoids hammering the package index). After each failure the compiler's output is classified into a
//! best-effort failure cause. Classification is advisory - it is surfaced in
//! logs but never alters the search, which stays exhaustive regardless.

use anyhow::{Context, Result};
use regex::Regex;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::FixedInterval;

use crate::config::Config;
use crate::core::PipmatrixError;
use crate::pip::PipCommand;
use crate::utils::ensure_dir;

/// Best-effort categorization of why pip-compile rejected a combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClassification {
    /// No build/version available for this platform/Python combination.
    MissingDistribution,
    /// A transitive requirement is not satisfiable under these exact pins.
    DependencyConflict,
    /// The log matched no known pattern (includes timeouts).
    Unknown,
}

impl fmt::Display for FailureClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDistribution => write!(f, "missing distribution"),
            Self::DependencyConflict => write!(f, "dependency conflict"),
            Self::Unknown => write!(f, "unknown failure"),
        }
    }
}

/// Outcome of a combination that failed all its attempts.
#[derive(Debug, Clone)]
pub struct ValidationFailure {
    /// Advisory failure cause from the last attempt's log
    pub classification: FailureClassification,
    /// Tail of the last attempt's compiler output
    pub log_excerpt: String,
}

static CONFLICT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"ResolutionImpossible|conflict is caused by|Cannot install|incompatible")
        .unwrap()
});

static MISSING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"No matching distribution found|Could not find a version that satisfies")
        .unwrap()
});

/// Classifies compiler output into a failure cause.
///
/// Conflict patterns are checked first: pip prints "could not find a
/// version" lines for conflicts too, so the more specific resolver messages
/// take precedence.
pub fn classify(log: &str) -> FailureClassification {
    if CONFLICT_RE.is_match(log) {
        FailureClassification::DependencyConflict
    } else if MISSING_RE.is_match(log) {
        FailureClassification::MissingDistribution
    } else {
        FailureClassification::Unknown
    }
}

/// How many trailing lines of compiler output to keep as the excerpt.
const EXCERPT_LINES: usize = 20;

fn excerpt(output: &str) -> String {
    let lines: Vec<&str> = output.lines().collect();
    let start = lines.len().saturating_sub(EXCERPT_LINES);
    lines[start..].join("\n")
}

/// Per-attempt outcome inside the retry loop.
enum AttemptError {
    /// Expected: the compiler rejected the combination (or timed out).
    Failed(ValidationFailure),
    /// The engine itself broke (spawn failure); never retried.
    Fatal(anyhow::Error),
}

/// Runs the external dependency compiler with bounded retries.
pub struct CompileRunner {
    python: String,
    attempt_timeout: Duration,
    retry_delay: Duration,
    log_path: PathBuf,
}

impl CompileRunner {
    /// Builds a runner from the loaded configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            python: config.python.clone(),
            attempt_timeout: Duration::from_secs(config.compile_timeout_secs),
            retry_delay: Duration::from_secs(config.retry_delay_secs),
            log_path: config.compile_log(),
        }
    }

    /// Validates one constraint file, retrying up to `max_retries` times.
    ///
    /// Returns `Ok(Ok(()))` as soon as one attempt succeeds (the resolved
    /// lock has then been written to `output`), `Ok(Err(failure))` after all
    /// attempts failed, and `Err` only for engine-fatal conditions such as a
    /// missing interpreter.
    pub async fn validate(
        &self,
        constraints: &Path,
        output: &Path,
        max_retries: u32,
    ) -> Result<Result<(), ValidationFailure>> {
        let strategy =
            FixedInterval::new(self.retry_delay).take(max_retries.saturating_sub(1) as usize);

        let result = RetryIf::spawn(
            strategy,
            || self.attempt(constraints, output),
            |e: &AttemptError| matches!(e, AttemptError::Failed(_)),
        )
        .await;

        match result {
            Ok(()) => Ok(Ok(())),
            Err(AttemptError::Failed(failure)) => Ok(Err(failure)),
            Err(AttemptError::Fatal(err)) => Err(err),
        }
    }

    /// One pip-compile attempt: run, append the log, classify on failure.
    async fn attempt(&self, constraints: &Path, output: &Path) -> Result<(), AttemptError> {
        let command = PipCommand::compile(&self.python, constraints, output)
            .with_timeout(Some(self.attempt_timeout));

        let outcome = match command.execute_unchecked().await {
            Ok(outcome) => outcome,
            Err(err) => {
                // Timeouts are bounded-wait validation failures; anything
                // else (spawn failure) is fatal.
                return match err.downcast_ref::<PipmatrixError>() {
                    Some(PipmatrixError::PipCommandTimeout { seconds, .. }) => {
                        let message = format!("pip-compile timed out after {seconds}s");
                        self.append_log(constraints, &message).map_err(AttemptError::Fatal)?;
                        Err(AttemptError::Failed(ValidationFailure {
                            classification: FailureClassification::Unknown,
                            log_excerpt: message,
                        }))
                    }
                    _ => Err(AttemptError::Fatal(err)),
                };
            }
        };

        let combined = format!("{}\n{}", outcome.stdout, outcome.stderr);
        self.append_log(constraints, &combined).map_err(AttemptError::Fatal)?;

        if outcome.success {
            tracing::info!(target: "pip", "pip-compile succeeded, lock written to {}", output.display());
            return Ok(());
        }

        let classification = classify(&combined);
        tracing::debug!(target: "pip", "pip-compile attempt failed ({classification})");
        Err(AttemptError::Failed(ValidationFailure {
            classification,
            log_excerpt: excerpt(&combined),
        }))
    }

    /// Appends one attempt's output to the diagnostics log.
    ///
    /// The log is append-only so attempts across odometer steps remain
    /// auditable.
    fn append_log(&self, constraints: &Path, output: &str) -> Result<()> {
        if let Some(parent) = self.log_path.parent() {
            ensure_dir(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| {
                format!("Failed to open diagnostics log: {}", self.log_path.display())
            })?;
        writeln!(
            file,
            "==== {} pip-compile {} ====\n{}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            constraints.display(),
            output.trim_end()
        )
        .context("Failed to append to diagnostics log")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_conflicts_before_missing_versions() {
        let log = "ERROR: Cannot install requests==2.0 because these package versions have conflicting dependencies.\n\
                   ResolutionImpossible: for help visit ...\n\
                   The conflict is caused by:\n    urllib3==2.0";
        assert_eq!(classify(log), FailureClassification::DependencyConflict);
    }

    #[test]
    fn classifies_missing_distribution() {
        let log = "ERROR: Could not find a version that satisfies the requirement torch==9.9.9\n\
                   ERROR: No matching distribution found for torch==9.9.9";
        assert_eq!(classify(log), FailureClassification::MissingDistribution);
    }

    #[test]
    fn unknown_when_no_pattern_matches() {
        assert_eq!(classify("Traceback (most recent call last): ..."), FailureClassification::Unknown);
    }

    #[test]
    fn excerpt_keeps_only_tail() {
        let long: String =
            (0..50).map(|i| format!("line {i}\n")).collect::<Vec<_>>().join("");
        let tail = excerpt(&long);
        assert!(tail.starts_with("line 30"));
        assert!(tail.ends_with("line 49"));
    }
}
