//! [`Runtime`] backed by the local disk.

// The one place allowed to touch std::fs directly.
#![allow(clippy::disallowed_methods)]

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{Runtime, RuntimeError, RuntimeResult};

/// Reads project files with `std::fs` on tokio's blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRuntime;

impl NativeRuntime {
    pub fn new() -> Self {
        Self
    }
}

async fn blocking<T, F>(path: &Path, op: F) -> RuntimeResult<T>
where
    T: Send + 'static,
    F: FnOnce(PathBuf) -> RuntimeResult<T> + Send + 'static,
{
    let path = path.to_path_buf();

    tokio::task::spawn_blocking(move || op(path))
        .await
        .map_err(|err| RuntimeError::Interrupted(err.to_string()))?
}

#[async_trait]
impl Runtime for NativeRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        blocking(path, |path| match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(source) if source.kind() == ErrorKind::NotFound => Err(RuntimeError::NotFound(path)),
            Err(source) => Err(RuntimeError::Read { path, source }),
        })
        .await
    }

    async fn is_file(&self, path: &Path) -> bool {
        blocking(path, |path| Ok(path.is_file())).await.unwrap_or(false)
    }
}
