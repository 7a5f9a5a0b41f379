//! Platform capabilities used by the resolver and the compiler.
//!
//! File system access goes through [`Runtime`], remote reads through
//! [`HttpClient`]. [`Fetcher`] combines both behind a single
//! location-keyed cache.

pub mod fetch;
pub mod http;
pub mod native;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

pub use fetch::{Fetcher, RetryPolicy};
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use native::NativeRuntime;

pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("no such file: {}", .0.display())]
    NotFound(PathBuf),

    #[error("unable to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },

    /// The blocking task was cancelled or panicked.
    #[error("file task did not complete: {0}")]
    Interrupted(String),
}

/// File system capability.
///
/// Locations handed to the fetcher that are not URLs are read through this
/// trait, so tests and embedders can substitute their own file system.
#[async_trait]
pub trait Runtime: Send + Sync + std::fmt::Debug {
    /// Full contents of `path`. A missing file is [`RuntimeError::NotFound`].
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// `true` for existing regular files only.
    async fn is_file(&self, path: &Path) -> bool;
}
