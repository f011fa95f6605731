//! Progress indicators for long-running resolution runs.
//!
//! Wraps `indicatif` with pipmatrix-specific styling and automatic disabling
//! in non-interactive environments. Because the true combination count can be
//! astronomically large, the bar supports both a bounded mode (percentage of
//! a known total) and an unbounded spinner mode (attempt counter only).
//!
//! # Environment Variables
//!
//! - `PIPMATRIX_NO_PROGRESS`: set to any value to disable all progress
//!   indicators (also set by the `--no-progress` CLI flag)

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};
use std::time::Duration;

/// Checks if progress bars should be disabled.
fn is_progress_disabled() -> bool {
    std::env::var("PIPMATRIX_NO_PROGRESS").is_ok()
}

/// A progress indicator for the resolution loop.
///
/// Created in bounded mode when the total combination count is computable
/// and small enough to be meaningful, otherwise as a spinner that only shows
/// the attempt count.
#[derive(Clone)]
pub struct ProgressBar {
    inner: IndicatifBar,
}

impl ProgressBar {
    /// Creates a bounded progress bar over a known combination count.
    pub fn new(len: u64) -> Self {
        let inner = if is_progress_disabled() {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new(len);
            bar.set_style(
                IndicatifStyle::with_template(
                    "{msg}\n{bar:40.cyan/blue} {pos}/{len} combinations ({percent}%)",
                )
                .unwrap_or_else(|_| IndicatifStyle::default_bar()),
            );
            bar
        };
        Self { inner }
    }

    /// Creates a spinner for search spaces too large for a percentage.
    pub fn new_spinner() -> Self {
        let inner = if is_progress_disabled() {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new_spinner();
            bar.set_style(
                IndicatifStyle::with_template("{spinner:.cyan} {msg} ({pos} attempts)")
                    .unwrap_or_else(|_| IndicatifStyle::default_spinner()),
            );
            bar.enable_steady_tick(Duration::from_millis(120));
            bar
        };
        Self { inner }
    }

    /// Sets the message shown alongside the bar.
    pub fn set_message(&self, msg: impl Into<String>) {
        self.inner.set_message(msg.into());
    }

    /// Sets the absolute position (attempts completed).
    pub fn set_position(&self, pos: u64) {
        self.inner.set_position(pos);
    }

    /// Finishes the bar, leaving a final message behind.
    pub fn finish_with_message(&self, msg: impl Into<String>) {
        self.inner.finish_with_message(msg.into());
    }

    /// Clears the bar from the terminal.
    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }

    /// Prints a log line above the bar without tearing it.
    pub fn println(&self, msg: impl AsRef<str>) {
        if self.inner.is_hidden() {
            println!("{}", msg.as_ref());
        } else {
            self.inner.println(msg.as_ref());
        }
    }
}
