//! Atomic file write operations using a temp-and-rename strategy.
//!
//! The iteration-state file is the single piece of durable state that makes
//! a search resumable, so it must never be observable in a half-written
//! state. Writes go to a sibling `.tmp` file, are synced to disk, and are
//! then renamed over the target.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Creates a directory and all parent directories if they don't exist.
///
/// Succeeds silently if the directory already exists.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Atomically writes a string to a file using a write-then-rename strategy.
///
/// The file either contains the new content or the old content, never a
/// partial write:
/// 1. Content is written to a temporary file (`.tmp` extension)
/// 2. The temporary file is synced to disk
/// 3. The temporary file is renamed over the target path
///
/// Parent directories are created automatically.
pub fn safe_write(path: &Path, content: &str) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let temp_path = path.with_extension("tmp");

    {
        let mut file = fs::File::create(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write to temp file: {}", temp_path.display()))?;
        file.sync_all().context("Failed to sync file to disk")?;
    }

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_safe_write() {
        let temp = tempdir().unwrap();
        let file_path = temp.path().join("test.txt");

        safe_write(&file_path, "test content").unwrap();

        let content = std::fs::read_to_string(&file_path).unwrap();
        assert_eq!(content, "test content");
    }

    #[test]
    fn test_safe_write_creates_parent_dirs() {
        let temp = tempdir().unwrap();
        let file_path = temp.path().join("subdir").join("test.txt");

        safe_write(&file_path, "test content").unwrap();

        assert!(file_path.exists());
    }

    #[test]
    fn test_safe_write_overwrites() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("atomic.txt");

        safe_write(&file, "initial").unwrap();
        safe_write(&file, "updated").unwrap();
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "updated");
    }

    #[test]
    fn test_safe_write_leaves_no_temp_file() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("state.txt");

        safe_write(&file, "42").unwrap();
        assert!(!file.with_extension("tmp").exists());
    }

    #[test]
    fn test_ensure_dir_idempotent() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("a").join("b");

        ensure_dir(&dir).unwrap();
        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }
}
