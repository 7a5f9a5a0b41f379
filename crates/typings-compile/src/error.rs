use thiserror::Error;
use typings_core::{CONFIG_FILE, FetchError, LocationError};

pub type Result<T> = std::result::Result<T, CompileError>;

/// Errors raised while compiling a dependency tree.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(
        "Unable to resolve entry \".d.ts\" file for \"{name}\", please make sure the module has a main or typings field"
    )]
    MissingEntry { name: String },

    #[error("Unable to read typings for \"{name}\". {} check the path is correct", author(.parent))]
    UnreadableEntry {
        name: String,
        parent: Option<String>,
        #[source]
        source: FetchError,
    },

    #[error(
        "Unable to read \"{path}\" from \"{name}\" ({src}). {} check the entry in \"{}\" is correct",
        author(.parent),
        CONFIG_FILE
    )]
    UnreadableImport {
        /// Location relative to the manifest of `name`.
        path: String,
        name: String,
        src: String,
        parent: Option<String>,
        #[source]
        source: FetchError,
    },

    #[error(
        "Attempted to compile \"{name}\" as a dependency, but it contains some ambient module declarations ({}).",
        quoted(.modules)
    )]
    AmbientInDependency { name: String, modules: Vec<String> },

    #[error("Attempted to compile \"{name}\" as an ambient module, but it looks like an external module")]
    ExternalModuleInAmbient { name: String },

    #[error("Unable to find dependency \"{module}\" imported by \"{name}\"")]
    MissingDependency { module: String, name: String },

    #[error("Unable to parse \"{path}\": {message}")]
    Syntax { path: String, message: String },

    #[error("Invalid reference in \"{name}\"")]
    Reference {
        name: String,
        #[source]
        source: LocationError,
    },
}

fn author(parent: &Option<String>) -> String {
    match parent {
        Some(parent) => format!("The author of \"{parent}\" needs to"),
        None => "You should".to_string(),
    }
}

fn quoted(modules: &[String]) -> String {
    modules
        .iter()
        .map(|module| format!("\"{module}\""))
        .collect::<Vec<_>>()
        .join(", ")
}
