//! Error handling for pipmatrix
//!
//! This module provides the error types and user-friendly error reporting for
//! the matrix resolver. The error system is designed around two principles:
//! 1. **Strongly-typed errors** for precise handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! The taxonomy separates three very different kinds of failure:
//! - **Load-time errors** ([`PipmatrixError::EmptyInput`],
//!   [`PipmatrixError::NoVersions`], parse errors) abort before a run starts -
//!   there is nothing to enumerate.
//! - **Persistence errors** ([`PipmatrixError::Persistence`]) abort a running
//!   search immediately, because resumability can no longer be guaranteed.
//! - **Per-combination validation failures are not represented here at all.**
//!   A pip-compile rejection is an expected, recoverable outcome that drives
//!   the search forward; it is modeled as data
//!   ([`crate::pip::compile::ValidationFailure`]), never as an error that
//!   propagates.

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for pipmatrix operations.
///
/// Each variant represents a specific failure mode and carries enough context
/// (paths, package names, stderr excerpts) for the CLI to explain what went
/// wrong and what to do about it.
#[derive(Error, Debug)]
pub enum PipmatrixError {
    /// The requirements source contained no usable requirement lines.
    ///
    /// Raised at load time, before any run starts. Blank lines and comments
    /// do not count as usable input.
    #[error("Requirements input is empty: no packages to enumerate")]
    EmptyInput,

    /// A package expanded to an empty candidate version list.
    ///
    /// Every package must resolve to at least one offerable version, even if
    /// that is just whatever a range query returns.
    #[error("No candidate versions found for package '{package}'")]
    NoVersions {
        /// The package whose candidate list came back empty
        package: String,
    },

    /// A requirement line failed validation.
    #[error("Invalid requirement on line {line}: \"{content}\"")]
    InvalidRequirement {
        /// 1-based line number in the requirements source
        line: usize,
        /// The offending line, verbatim
        content: String,
    },

    /// The requirements file could not be found.
    #[error("Requirements file not found: {path}")]
    RequirementsNotFound {
        /// The path that was searched
        path: String,
    },

    /// Fetching a requirements file over HTTP failed.
    #[error("Failed to fetch requirements from {url}")]
    NetworkError {
        /// The URL that could not be fetched
        url: String,
        /// The underlying transport or status failure
        reason: String,
    },

    /// The durable iteration-state file could not be read or written.
    ///
    /// This is fatal to a running search: if the ordinal cannot be persisted
    /// before validation, a crash could silently skip or repeat combinations.
    #[error("Failed to persist iteration state at {path}")]
    Persistence {
        /// Path of the iteration-state file
        path: String,
        /// The underlying I/O failure
        reason: String,
    },

    /// The configured Python interpreter is not installed or not on PATH.
    #[error("Python interpreter '{command}' not found in PATH")]
    PythonNotFound {
        /// The interpreter command that was searched for
        command: String,
    },

    /// A pip/pip-tools subprocess failed in a way that is not a plain
    /// version-resolution rejection (e.g. the module is not installed).
    #[error("pip operation failed: {operation}")]
    PipCommandError {
        /// The pip operation that failed (e.g. "index versions", "compile")
        operation: String,
        /// The error output from the subprocess
        stderr: String,
    },

    /// A pip subprocess exceeded its wall-clock ceiling.
    #[error("pip operation timed out after {seconds}s: {operation}")]
    PipCommandTimeout {
        /// The pip operation that timed out
        operation: String,
        /// The timeout that was exceeded, in seconds
        seconds: u64,
    },

    /// Configuration file error.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// TOML parsing error from config files.
    #[error("TOML parsing error")]
    TomlError(#[from] toml::de::Error),

    /// I/O error wrapper.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Catch-all for errors that don't fit other categories.
    #[error("{0}")]
    Other(String),
}

/// Wrapper that pairs an error with a user-facing suggestion and optional
/// details.
///
/// The CLI converts any failure into an `ErrorContext` before printing, so
/// users see a colored message plus a concrete next step instead of a bare
/// Debug dump.
pub struct ErrorContext {
    /// The underlying error
    pub error: anyhow::Error,
    /// Actionable suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Additional background details
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from any error type.
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Self {
            error: error.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Attach an actionable suggestion.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach background details.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{} {}", "Error:".red().bold(), self.error);
        if let Some(ref details) = self.details {
            eprintln!("  {} {}", "Details:".yellow(), details);
        }
        if let Some(ref suggestion) = self.suggestion {
            eprintln!("  {} {}", "Suggestion:".cyan(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {details}")?;
        }
        if let Some(ref suggestion) = self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Convert any error into a user-friendly [`ErrorContext`] with a suggestion
/// matched to the failure category.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let suggestion = match error.downcast_ref::<PipmatrixError>() {
        Some(PipmatrixError::EmptyInput) => Some(
            "Check that the requirements file contains at least one package line \
             (blank lines and # comments are ignored)"
                .to_string(),
        ),
        Some(PipmatrixError::NoVersions { package }) => Some(format!(
            "Run 'pip index versions {package}' manually to see what the index offers, \
             or pin the package explicitly with '=='"
        )),
        Some(PipmatrixError::InvalidRequirement { .. }) => Some(
            "Requirement lines must look like 'name', 'name==1.0', or 'name>=1.0,<2.0' \
             with optional [extras] and ; markers"
                .to_string(),
        ),
        Some(PipmatrixError::RequirementsNotFound { .. }) => {
            Some("Check the path, or pass a URL to fetch the file over HTTP".to_string())
        }
        Some(PipmatrixError::NetworkError { .. }) => {
            Some("Check your network connection and that the URL is reachable".to_string())
        }
        Some(PipmatrixError::Persistence { .. }) => Some(
            "The run was aborted to avoid losing resume state. Check permissions on the \
             working directory and restart - the search resumes from the last persisted attempt"
                .to_string(),
        ),
        Some(PipmatrixError::PythonNotFound { command }) => Some(format!(
            "Install Python or point pipmatrix at an interpreter with 'python = \"...\"' in \
             pipmatrix.toml (searched for '{command}')"
        )),
        Some(PipmatrixError::PipCommandError { stderr, .. })
            if stderr.contains("No module named piptools") =>
        {
            Some("Install pip-tools in the target environment: pip install pip-tools".to_string())
        }
        Some(PipmatrixError::PipCommandTimeout { .. }) => Some(
            "Increase compile_timeout_secs in pipmatrix.toml if the package index is \
             just slow"
                .to_string(),
        ),
        Some(PipmatrixError::ConfigError { .. } | PipmatrixError::TomlError(_)) => {
            Some("Check the syntax of pipmatrix.toml".to_string())
        }
        _ => None,
    };

    let mut ctx = ErrorContext::new(error);
    if let Some(s) = suggestion {
        ctx = ctx.with_suggestion(s);
    }
    ctx
}
