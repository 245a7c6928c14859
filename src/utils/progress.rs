//! Spinners for long-running CLI operations
//!
//! A [`Spinner`] wraps an `indicatif` progress bar with bindep's styling. Spinners are hidden
//! when progress is disabled with `--no-progress`, when `BINDEP_NO_PROGRESS` is set, or when
//! stderr is not a terminal (indicatif draws nothing there).

use crate::constants::NO_PROGRESS_ENV;
use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};
use std::time::Duration;

/// Returns true when `BINDEP_NO_PROGRESS` disables progress output.
pub fn is_progress_disabled() -> bool {
    std::env::var_os(NO_PROGRESS_ENV).is_some()
}

/// An animated spinner with a message.
#[derive(Debug, Clone)]
pub struct Spinner {
    inner: IndicatifBar,
}

impl Spinner {
    /// Starts a spinner showing `message`; hidden when `enabled` is false.
    pub fn new(message: impl Into<String>, enabled: bool) -> Self {
        let bar = if !enabled || is_progress_disabled() {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new_spinner();
            bar.set_style(spinner_style());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        };
        bar.set_message(message.into());
        Self {
            inner: bar,
        }
    }

    /// Replaces the spinner's message.
    pub fn set_message(&self, message: impl Into<String>) {
        self.inner.set_message(message.into());
    }

    /// Stops the spinner and leaves `message` on screen.
    pub fn finish_with_message(&self, message: impl Into<String>) {
        self.inner.finish_with_message(message.into());
    }

    /// Stops the spinner and clears it.
    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }
}

fn spinner_style() -> IndicatifStyle {
    IndicatifStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| IndicatifStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"])
}
