//! Type-safe pip command builder for consistent subprocess execution.
//!
//! Every pip and pip-tools invocation goes through [`PipCommand`], which runs
//! the configured Python interpreter with `-m` so the right environment's pip
//! is used. The builder handles timeout management, output capture, tracing,
//! and error mapping in one place.
//!
//! Two execution modes exist because callers care about exit codes in very
//! different ways: [`PipCommand::execute`] treats a non-zero exit as an
//! engine error (right for `pip index versions` - the query itself failed),
//! while [`PipCommand::execute_unchecked`] reports the exit status as data
//! (right for `pip-compile`, where a non-zero exit just means "this
//! combination failed" and must never crash the engine).

pub mod compile;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::core::PipmatrixError;

/// Locate the configured Python interpreter on PATH.
pub fn find_python(command: &str) -> Result<PathBuf> {
    which::which(command).map_err(|_| {
        PipmatrixError::PythonNotFound {
            command: command.to_string(),
        }
        .into()
    })
}

/// Builder for `python -m ...` subprocess invocations.
pub struct PipCommand {
    /// Python interpreter command or path
    python: String,
    /// Arguments after the interpreter (starting with `-m`)
    args: Vec<String>,
    /// Working directory for the subprocess
    current_dir: Option<PathBuf>,
    /// Maximum duration to wait for completion (None = no timeout)
    timeout_duration: Option<Duration>,
    /// Short operation name used in logs and error messages
    operation: String,
}

/// Captured output from a pip subprocess.
#[derive(Debug)]
pub struct PipCommandOutput {
    /// Whether the process exited with status zero
    pub success: bool,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl PipCommand {
    /// Creates a builder running `<python> -m <module> <args...>`.
    pub fn new(python: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            python: python.into(),
            args: Vec::new(),
            current_dir: None,
            timeout_duration: Some(crate::constants::PIP_INDEX_TIMEOUT),
            operation: operation.into(),
        }
    }

    /// Creates a `pip index versions <package>` query.
    pub fn index_versions(python: impl Into<String>, package: &str) -> Self {
        Self::new(python, "index versions")
            .args(["-m", "pip", "index", "versions", package])
            .with_timeout(Some(crate::constants::PIP_INDEX_TIMEOUT))
    }

    /// Creates a `pip-compile` invocation over an exact-pin constraint file.
    ///
    /// The argument convention is fixed: backtracking resolver, prefer
    /// binary wheels, upgrade to the pinned versions, write the resolved
    /// lock to `output`.
    pub fn compile(python: impl Into<String>, input: &Path, output: &Path) -> Self {
        Self::new(python, "compile")
            .args(["-m", "piptools", "compile"])
            .args([
                "--resolver=backtracking",
                "--prefer-binary",
                "--upgrade",
                "--output-file",
            ])
            .arg(output.display().to_string())
            .arg(input.display().to_string())
    }

    /// Adds a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the working directory for the subprocess.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Sets a custom timeout (None for no timeout).
    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// Executes the command, reporting the exit status as data.
    ///
    /// Returns `Err` only when the engine itself failed: the process could
    /// not be spawned, or the wall-clock ceiling was exceeded
    /// ([`PipmatrixError::PipCommandTimeout`]).
    pub async fn execute_unchecked(self) -> Result<PipCommandOutput> {
        let start = std::time::Instant::now();
        let mut cmd = Command::new(&self.python);
        cmd.args(&self.args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.stdin(Stdio::null());
        if let Some(ref dir) = self.current_dir {
            cmd.current_dir(dir);
        }

        tracing::debug!(
            target: "pip",
            "Executing command: {} {}",
            self.python,
            self.args.join(" ")
        );

        let output_future = cmd.output();
        let output = if let Some(duration) = self.timeout_duration {
            match timeout(duration, output_future).await {
                Ok(result) => result
                    .with_context(|| format!("Failed to execute {} -m pip", self.python))?,
                Err(_) => {
                    tracing::warn!(
                        target: "pip",
                        "Command timed out after {}s: {} {}",
                        duration.as_secs(),
                        self.python,
                        self.args.join(" ")
                    );
                    return Err(PipmatrixError::PipCommandTimeout {
                        operation: self.operation,
                        seconds: duration.as_secs(),
                    }
                    .into());
                }
            }
        } else {
            output_future
                .await
                .with_context(|| format!("Failed to execute {} -m pip", self.python))?
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::debug!(
                target: "pip",
                "Command failed with exit code {:?}: {}",
                output.status.code(),
                stderr.trim()
            );
        }

        let elapsed = start.elapsed();
        if elapsed.as_secs() > 1 {
            tracing::debug!(
                target: "pip::perf",
                "pip {} took {:.2}s",
                self.operation,
                elapsed.as_secs_f64()
            );
        }

        Ok(PipCommandOutput {
            success: output.status.success(),
            stdout,
            stderr,
        })
    }

    /// Executes the command, treating a non-zero exit as an error.
    pub async fn execute(self) -> Result<PipCommandOutput> {
        let operation = self.operation.clone();
        let output = self.execute_unchecked().await?;
        if !output.success {
            return Err(PipmatrixError::PipCommandError {
                operation,
                stderr: if output.stderr.is_empty() {
                    output.stdout
                } else {
                    output.stderr
                },
            }
            .into());
        }
        Ok(output)
    }
}
