//! Error types for the typings CLI.
//!
//! Library errors are wrapped in [`CliError`], which knows how to suggest a
//! fix for the common failures. Conversion into a `miette` report happens
//! once, in `main`.

mod miette;

pub use self::miette::cli_error_to_miette;

use std::path::PathBuf;
use thiserror::Error;
use typings_compile::CompileError;
use typings_config::ConfigError;
use typings_core::LocationError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Resolution error: {0}")]
    Resolve(#[from] typings_core::Error),

    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("Invalid dependency: {0}")]
    Location(#[from] LocationError),

    #[error("Unable to infer typings name from project. Use the `--name` flag to specify it manually")]
    NameRequired,

    #[error("Unable to write \"{}\"", .path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to read reference file \"{}\"", .path.display())]
    ReadIndex {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// A suggestion shown under the error, when one applies.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            CliError::Config(_) => Some("Check the JSON in your .typingsrc files and TYPINGS_* variables"),
            CliError::Resolve(err) if err.is_circular() => {
                Some("Remove the dependency that points back to one of its consumers")
            }
            CliError::Resolve(err)
                if err.is_not_found() || matches!(err, typings_core::Error::NotInstalled { .. }) =>
            {
                Some("Install the package or fix its location in typings.json")
            }
            CliError::Compile(CompileError::MissingEntry { .. }) => {
                Some("Add a \"typings\" or \"main\" field to the dependency's manifest")
            }
            CliError::Compile(CompileError::AmbientInDependency { .. }) => {
                Some("Install it as an ambient dependency or bundle with --ambient")
            }
            CliError::Location(_) => Some("Use a prefix such as npm:, bower:, file:, github:, bitbucket: or a URL"),
            _ => None,
        }
    }
}

pub type Result<T, E = CliError> = std::result::Result<T, E>;
