//! Configuration for pipmatrix.
//!
//! Configuration comes from `pipmatrix.toml`, searched in the current
//! directory and then in the user config directory
//! (`~/.config/pipmatrix/pipmatrix.toml`), or from an explicit `--config`
//! path. Every field has a sensible default, so no config file is required.
//!
//! # Example
//!
//! ```toml
//! python = "python3.11"
//! versions_per_package = 5
//! compile_retries = 3
//! retry_delay_secs = 5
//! compile_timeout_secs = 300
//! work_dir = "~/pipmatrix-runs"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    self, COMPILE_ATTEMPT_TIMEOUT, COMPILE_RETRY_DELAY, CONFIG_FILE, DEFAULT_COMPILE_RETRIES,
    DEFAULT_VERSIONS_PER_PACKAGE, DEFAULT_WORK_DIR,
};
use crate::core::PipmatrixError;

/// Runtime configuration for a resolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Python interpreter command used for every pip invocation.
    ///
    /// Defaults to `python3` on Unix and `python` on Windows.
    pub python: String,

    /// How many of the most recent versions to keep per unpinned package.
    pub versions_per_package: usize,

    /// pip-compile attempts per combination before it is declared failed.
    pub compile_retries: u32,

    /// Flat delay between pip-compile attempts, in seconds.
    pub retry_delay_secs: u64,

    /// Wall-clock ceiling for a single pip-compile attempt, in seconds.
    pub compile_timeout_secs: u64,

    /// Working directory holding state, constraint, log, and output files.
    ///
    /// Tilde expansion is applied when the config is loaded.
    pub work_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            python: constants::default_python_command().to_string(),
            versions_per_package: DEFAULT_VERSIONS_PER_PACKAGE,
            compile_retries: DEFAULT_COMPILE_RETRIES,
            retry_delay_secs: COMPILE_RETRY_DELAY.as_secs(),
            compile_timeout_secs: COMPILE_ATTEMPT_TIMEOUT.as_secs(),
            work_dir: PathBuf::from(DEFAULT_WORK_DIR),
        }
    }
}

impl Config {
    /// Load configuration, preferring an explicit path when given.
    ///
    /// Without an explicit path, `pipmatrix.toml` is searched in the current
    /// directory and then in the user config directory; if neither exists,
    /// defaults are used.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(PipmatrixError::ConfigError {
                    message: format!("config file not found: {}", path.display()),
                }
                .into());
            }
            return Self::from_file(path);
        }

        let local = PathBuf::from(CONFIG_FILE);
        if local.exists() {
            return Self::from_file(&local);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let global = config_dir.join("pipmatrix").join(CONFIG_FILE);
            if global.exists() {
                return Self::from_file(&global);
            }
        }

        Ok(Self::default())
    }

    /// Parse a config file, applying tilde expansion to path fields.
    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: Self = toml::from_str(&content).map_err(PipmatrixError::TomlError)?;
        config.work_dir =
            PathBuf::from(shellexpand::tilde(&config.work_dir.to_string_lossy()).into_owned());
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would make the search degenerate.
    fn validate(&self) -> Result<()> {
        if self.python.trim().is_empty() {
            return Err(PipmatrixError::ConfigError {
                message: "python command must not be empty".to_string(),
            }
            .into());
        }
        if self.versions_per_package == 0 {
            return Err(PipmatrixError::ConfigError {
                message: "versions_per_package must be at least 1".to_string(),
            }
            .into());
        }
        if self.compile_retries == 0 {
            return Err(PipmatrixError::ConfigError {
                message: "compile_retries must be at least 1".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Path of the durable iteration-state file.
    pub fn state_file(&self) -> PathBuf {
        self.work_dir.join(constants::ITERATION_STATE_FILE)
    }

    /// Path of the reused exact-pin constraint input file.
    pub fn constraints_file(&self) -> PathBuf {
        self.work_dir.join(constants::CONSTRAINTS_FILE)
    }

    /// Path of the append-only pip-compile diagnostics log.
    pub fn compile_log(&self) -> PathBuf {
        self.work_dir.join(constants::COMPILE_LOG_FILE)
    }

    /// Path of the resolved lock output for a given attempt number.
    ///
    /// The attempt number is baked into the file name so successive runs do
    /// not collide.
    pub fn output_file(&self, attempt: u64) -> PathBuf {
        self.work_dir.join(format!("compiled_requirements_{attempt}.txt"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.versions_per_package, 3);
        assert_eq!(config.compile_retries, 3);
        assert_eq!(config.retry_delay_secs, 5);
        assert!(!config.python.is_empty());
    }

    #[test]
    fn load_explicit_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("pipmatrix.toml");
        std::fs::write(&path, "python = \"python3.12\"\nversions_per_package = 5\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.python, "python3.12");
        assert_eq!(config.versions_per_package, 5);
        // Unspecified fields keep their defaults
        assert_eq!(config.compile_retries, 3);
    }

    #[test]
    fn load_missing_explicit_file_fails() {
        let temp = tempdir().unwrap();
        let result = Config::load(Some(&temp.path().join("nope.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_unknown_fields() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("pipmatrix.toml");
        std::fs::write(&path, "pyton = \"python3\"\n").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn rejects_degenerate_values() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("pipmatrix.toml");
        std::fs::write(&path, "versions_per_package = 0\n").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn derived_paths_live_under_work_dir() {
        let config = Config {
            work_dir: PathBuf::from("/tmp/run"),
            ..Config::default()
        };
        assert_eq!(config.state_file(), PathBuf::from("/tmp/run/ITERATION_STATE.txt"));
        assert_eq!(config.constraints_file(), PathBuf::from("/tmp/run/constraints.in"));
        assert_eq!(
            config.output_file(7),
            PathBuf::from("/tmp/run/compiled_requirements_7.txt")
        );
    }
}
