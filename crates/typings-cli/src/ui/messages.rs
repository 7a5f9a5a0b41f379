//! Status lines printed to stderr.

use owo_colors::{OwoColorize, Style};

pub fn success(message: &str) {
    status("✓", Style::new().green().bold(), message, false);
}

/// Diagnostics use this; they never change the exit code.
pub fn warning(message: &str) {
    status("⚠", Style::new().yellow().bold(), message, true);
}

fn status(symbol: &str, style: Style, message: &str, tint_message: bool) {
    if !console::colors_enabled_stderr() {
        eprintln!("{symbol} {message}");
    } else if tint_message {
        eprintln!("{} {}", symbol.style(style), message.style(style));
    } else {
        eprintln!("{} {message}", symbol.style(style));
    }
}
