//! The rc settings shape.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 5000;

/// Settings read from `.typingsrc` files and the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RcConfig {
    /// Proxy for every scheme.
    pub proxy: Option<String>,
    pub http_proxy: Option<String>,
    pub https_proxy: Option<String>,
    /// Comma separated hosts that bypass the proxy.
    pub no_proxy: Option<String>,
    pub reject_unauthorized: bool,
    /// Path to a PEM certificate authority.
    pub ca: Option<PathBuf>,
    /// Path to a PEM client key.
    pub key: Option<PathBuf>,
    /// Path to a PEM client certificate.
    pub cert: Option<PathBuf>,
    pub user_agent: Option<String>,
    pub max_retries: u32,
    /// Delay between retries, in milliseconds.
    pub retry_delay: u64,
}

impl Default for RcConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            http_proxy: None,
            https_proxy: None,
            no_proxy: None,
            reject_unauthorized: true,
            ca: None,
            key: None,
            cert: None,
            user_agent: None,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY_MS,
        }
    }
}
