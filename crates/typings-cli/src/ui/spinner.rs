//! Spinner for the resolve and compile steps.

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::time::Duration;

pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    /// Start a spinner. A hidden one is used when `visible` is false.
    pub fn new(message: &str, visible: bool) -> Self {
        if !visible {
            return Self { pb: ProgressBar::hidden() };
        }

        let style = ProgressStyle::with_template("{spinner:.cyan} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"]);

        let pb = ProgressBar::new_spinner().with_style(style).with_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));

        Self { pb }
    }

    pub fn set_message(&self, message: &str) {
        self.pb.set_message(message.to_owned());
    }

    pub fn fail(&self, message: &str) {
        self.pb.finish_with_message(format!("{} {}", "✗".red(), message));
    }

    /// Remove the spinner line without a final message.
    pub fn clear(&self) {
        self.pb.finish_and_clear();
    }
}
