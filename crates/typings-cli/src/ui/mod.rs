//! Terminal output: status messages, a spinner and tree rendering.
//!
//! Everything is written to stderr except command results (`list`, `parse`),
//! which go to stdout so they can be piped.

mod messages;
mod spinner;
mod tree;

pub use messages::{success, warning};
pub use spinner::Spinner;
pub use tree::render_tree;

/// A CI provider is detected from its environment.
pub fn is_ci() -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "TRAVIS"]
        .iter()
        .any(|name| std::env::var_os(name).is_some())
}

/// Color decision before `--no-color` is applied.
///
/// Respects `NO_COLOR` and `FORCE_COLOR`, then falls back to terminal detection.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }

    console::user_attended_stderr()
}

/// Apply the color decision for the rest of the process.
pub fn init_colors(no_color: bool) {
    let enabled = !no_color && should_use_color();
    console::set_colors_enabled(enabled);
    console::set_colors_enabled_stderr(enabled);
}

/// Whether animated output makes sense.
pub fn is_interactive() -> bool {
    console::user_attended_stderr() && !is_ci()
}
