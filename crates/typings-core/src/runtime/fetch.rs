//! Location-keyed content fetcher.
//!
//! A cache miss starts exactly one read whose *pending* result is stored,
//! so concurrent callers asking for the same location await the same
//! future instead of issuing duplicate reads.

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use super::http::{HttpClient, HttpOptions, ReqwestClient};
use super::native::NativeRuntime;
use super::{Runtime, RuntimeError};
use crate::error::{Error, FetchError, Result};
use crate::path::is_http;

type SharedFetch = Shared<BoxFuture<'static, std::result::Result<Arc<str>, FetchError>>>;

/// Bounded retry with a fixed delay, applied to transport failures only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Single attempt, no retries.
    pub const fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(5000))
    }
}

/// Reads local paths and remote URLs, caching by exact location.
#[derive(Clone)]
pub struct Fetcher {
    inner: Arc<FetcherInner>,
}

struct FetcherInner {
    runtime: Arc<dyn Runtime>,
    http: Arc<dyn HttpClient>,
    retry: RetryPolicy,
    cache: Mutex<FxHashMap<String, SharedFetch>>,
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("runtime", &self.inner.runtime)
            .field("http", &self.inner.http)
            .field("retry", &self.inner.retry)
            .field("cached", &self.inner.cache.lock().len())
            .finish()
    }
}

impl Fetcher {
    pub fn new(runtime: Arc<dyn Runtime>, http: Arc<dyn HttpClient>, retry: RetryPolicy) -> Self {
        Self {
            inner: Arc::new(FetcherInner {
                runtime,
                http,
                retry,
                cache: Mutex::new(FxHashMap::default()),
            }),
        }
    }

    /// Native file system plus a `reqwest` client.
    pub fn native(options: &HttpOptions, retry: RetryPolicy) -> Result<Self> {
        let http = ReqwestClient::new(options)?;
        Ok(Self::new(Arc::new(NativeRuntime::new()), Arc::new(http), retry))
    }

    /// A fetcher sharing capabilities with this one but starting with an empty cache.
    pub fn fresh(&self) -> Self {
        Self::new(
            Arc::clone(&self.inner.runtime),
            Arc::clone(&self.inner.http),
            self.inner.retry,
        )
    }

    pub fn runtime(&self) -> &Arc<dyn Runtime> {
        &self.inner.runtime
    }

    /// Whether a local path is an existing file. Always `false` for URLs.
    pub async fn is_file(&self, location: &str) -> bool {
        !is_http(location) && self.inner.runtime.is_file(Path::new(location)).await
    }

    /// Read the text at `location`, byte order mark removed.
    pub async fn fetch_text(&self, location: &str) -> std::result::Result<Arc<str>, FetchError> {
        let pending = {
            let mut cache = self.inner.cache.lock();
            cache
                .entry(location.to_string())
                .or_insert_with(|| self.start(location))
                .clone()
        };

        pending.await
    }

    /// Read and deserialize JSON. With `allow_empty`, an empty file yields `T::default()`.
    pub async fn fetch_json<T>(&self, location: &str, allow_empty: bool) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let text = self.fetch_text(location).await?;

        if allow_empty && text.trim().is_empty() {
            return Ok(T::default());
        }

        serde_json::from_str(&text).map_err(|source| Error::Json {
            location: location.to_string(),
            source,
        })
    }

    fn start(&self, location: &str) -> SharedFetch {
        let runtime = Arc::clone(&self.inner.runtime);
        let http = Arc::clone(&self.inner.http);
        let retry = self.inner.retry;
        let location = location.to_string();

        async move {
            let text = if is_http(&location) {
                read_http(http.as_ref(), &location, retry).await?
            } else {
                read_local(runtime.as_ref(), &location).await?
            };

            let text = text.strip_prefix('\u{feff}').unwrap_or(text.as_str());
            Ok::<_, FetchError>(Arc::<str>::from(text))
        }
        .boxed()
        .shared()
    }
}

async fn read_local(runtime: &dyn Runtime, location: &str) -> std::result::Result<String, FetchError> {
    tracing::trace!(location, "reading file");

    let bytes = runtime.read_file(Path::new(location)).await.map_err(|err| match err {
        RuntimeError::NotFound(path) => FetchError::NotFound { path },
        other => FetchError::Io {
            location: location.to_string(),
            message: other.to_string(),
        },
    })?;

    String::from_utf8(bytes).map_err(|err| FetchError::Io {
        location: location.to_string(),
        message: err.to_string(),
    })
}

async fn read_http(
    http: &dyn HttpClient,
    url: &str,
    retry: RetryPolicy,
) -> std::result::Result<String, FetchError> {
    let mut last_error = None;

    for attempt in 0..=retry.max_retries {
        tracing::debug!(url, attempt, "requesting");

        match http.get(url).await {
            Ok(response) if (200..300).contains(&response.status) => return Ok(response.body),
            // A definitive answer from the server, never retried.
            Ok(response) => {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: response.status,
                });
            }
            Err(err) => {
                if !is_retryable(&err) {
                    return Err(err);
                }
                last_error = Some(err);
                if attempt < retry.max_retries {
                    tokio::time::sleep(retry.delay).await;
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| FetchError::Transport {
        url: url.to_string(),
        message: "retries exhausted".to_string(),
    }))
}

fn is_retryable(err: &FetchError) -> bool {
    matches!(err, FetchError::Transport { .. })
}
