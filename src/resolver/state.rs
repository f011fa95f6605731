//! Durable iteration state: the single integer that makes a run resumable.
//!
//! The store holds exactly the most recent ordinal as a decimal integer -
//! a whole-value overwrite, not an append log. The controller writes it
//! *before* each validation attempt begins, so a crash (or operator stop)
//! mid-validation resumes by re-validating the same combination rather than
//! skipping it. Any failure to write is fatal to the run: without the
//! ordinal on disk, resumability cannot be guaranteed.

use anyhow::Result;
use std::path::PathBuf;

use crate::core::PipmatrixError;
use crate::utils::safe_write;

/// Durable, monotonically increasing attempt counter.
pub struct IterationStateStore {
    path: PathBuf,
}

impl IterationStateStore {
    /// Creates a store backed by the given file path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Reads the persisted ordinal, or 0 when no prior state exists.
    ///
    /// Unreadable or malformed content is a [`PipmatrixError::Persistence`]
    /// failure rather than a silent restart from zero - a corrupt state file
    /// deserves operator attention, not a quietly repeated search.
    pub fn read(&self) -> Result<u64> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(PipmatrixError::Persistence {
                    path: self.path.display().to_string(),
                    reason: e.to_string(),
                }
                .into());
            }
        };
        content.trim().parse::<u64>().map_err(|e| {
            PipmatrixError::Persistence {
                path: self.path.display().to_string(),
                reason: format!("malformed state file: {e}"),
            }
            .into()
        })
    }

    /// Overwrites the persisted ordinal atomically.
    pub fn write(&self, ordinal: u64) -> Result<()> {
        safe_write(&self.path, &ordinal.to_string()).map_err(|e| {
            PipmatrixError::Persistence {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Removes the persisted state, returning the ordinal that was stored.
    ///
    /// Used by the `reset` command. Returns `None` when no state existed.
    pub fn clear(&self) -> Result<Option<u64>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let previous = self.read()?;
        std::fs::remove_file(&self.path).map_err(|e| PipmatrixError::Persistence {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(previous))
    }
}
