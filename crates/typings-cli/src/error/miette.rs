//! Conversion of CLI errors into `miette` reports.

use miette::Report;
use std::error::Error as _;

use crate::error::CliError;

/// Render the error, every underlying cause and the hint into one report.
pub fn cli_error_to_miette(err: CliError) -> Report {
    let mut message = err.to_string();

    let mut source = err.source();
    // Transparent wrappers repeat their inner message; skip exact repeats.
    let mut last = message.clone();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !last.ends_with(&text) {
            message.push_str(&format!("\n  Caused by: {text}"));
        }
        last = text;
        source = cause.source();
    }

    if let Some(hint) = err.hint() {
        message.push_str(&format!("\n\nHint: {hint}"));
    }

    miette::miette!("{}", message)
}
