//! Test doubles for remote reads.

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::time::Duration;

use super::{Fetcher, HttpClient, HttpResponse, NativeRuntime, RetryPolicy};
use crate::error::FetchError;

#[derive(Debug, Default)]
struct Route {
    response: Option<HttpResponse>,
    failures_left: usize,
    requests: usize,
}

/// In-process [`HttpClient`] with canned responses.
///
/// Unknown URLs answer `404`. Every request is counted per URL.
#[derive(Debug, Default)]
pub struct StaticHttp {
    routes: Mutex<FxHashMap<String, Route>>,
}

impl StaticHttp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with `status` and `body`.
    pub fn with_response(self, url: &str, status: u16, body: &str) -> Self {
        self.routes.lock().entry(url.to_string()).or_default().response = Some(HttpResponse {
            status,
            body: body.to_string(),
        });
        self
    }

    /// Fail the first `count` requests to `url` at the transport level.
    pub fn with_transport_failures(self, url: &str, count: usize) -> Self {
        self.routes.lock().entry(url.to_string()).or_default().failures_left = count;
        self
    }

    /// Number of requests issued for `url`.
    pub fn requests(&self, url: &str) -> usize {
        self.routes.lock().get(url).map_or(0, |route| route.requests)
    }
}

#[async_trait]
impl HttpClient for StaticHttp {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let mut routes = self.routes.lock();
        let route = routes.entry(url.to_string()).or_default();
        route.requests += 1;

        if route.failures_left > 0 {
            route.failures_left -= 1;
            return Err(FetchError::Transport {
                url: url.to_string(),
                message: "connection reset".to_string(),
            });
        }

        Ok(route.response.clone().unwrap_or(HttpResponse {
            status: 404,
            body: String::new(),
        }))
    }
}

/// Native file system with `http` for remote reads and a 1ms retry delay.
pub fn test_fetcher(http: Arc<StaticHttp>) -> Fetcher {
    Fetcher::new(
        Arc::new(NativeRuntime::new()),
        http,
        RetryPolicy::new(3, Duration::from_millis(1)),
    )
}
