//! Error types for dependency parsing, fetching and resolution.

use std::path::PathBuf;
use thiserror::Error;

use crate::constants::CONFIG_FILE;

/// Result type for resolver operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A dependency string could not be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("Unsupported dependency: {raw}")]
    UnknownScheme { raw: String },

    #[error("Only \".d.ts\" files and \"{}\" are supported, got \"{raw}\"", CONFIG_FILE)]
    InvalidFileTarget { raw: String },

    #[error("Invalid dependency location \"{raw}\": {reason}")]
    InvalidLocation { raw: String, reason: String },
}

/// Reading a location failed.
///
/// Cloneable so a single pending fetch can be awaited by every caller that
/// asked for the same location.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("File not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Unable to read \"{location}\": {message}")]
    Io { location: String, message: String },

    #[error("Invalid response from \"{url}\" ({status})")]
    Status { url: String, status: u16 },

    #[error("Unable to connect to \"{url}\": {message}")]
    Transport { url: String, message: String },
}

impl FetchError {
    /// Whether the location simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound { .. })
    }
}

/// Errors raised while resolving a dependency tree.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Unable to parse \"{location}\"")]
    Json {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Circular dependency detected using \"{src}\" ({})", .chain.join(" <- "))]
    CircularDependency { src: String, chain: Vec<String> },

    #[error("Unable to find \"{raw}\" from \"{}\"", .cwd.display())]
    NotInstalled { raw: String, cwd: PathBuf },

    #[error("Unable to configure HTTP client: {0}")]
    HttpClient(String),

    #[error("Unable to resolve \"{name}\" ({raw}) from \"{consumer}\"")]
    BranchResolution {
        name: String,
        raw: String,
        consumer: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Whether this error, or any error it wraps, is a dependency cycle.
    pub fn is_circular(&self) -> bool {
        match self {
            Error::CircularDependency { .. } => true,
            Error::BranchResolution { source, .. } => source.is_circular(),
            _ => false,
        }
    }

    /// Whether the underlying cause is a missing local file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Fetch(err) if err.is_not_found())
    }
}
