//! Cross-platform utilities shared across pipmatrix.

pub mod fs;
pub mod progress;

pub use fs::{ensure_dir, safe_write};
