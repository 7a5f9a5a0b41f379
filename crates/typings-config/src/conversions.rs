//! Conversions into the core's runtime settings.

use std::path::Path;
use std::time::Duration;

use typings_core::RetryPolicy;
use typings_core::runtime::http::HttpOptions;

use crate::config::RcConfig;
use crate::error::{ConfigError, Result};

impl RcConfig {
    /// HTTP client settings. Certificate files are read here.
    pub fn http_options(&self) -> Result<HttpOptions> {
        Ok(HttpOptions {
            user_agent: self.user_agent.clone(),
            proxy: self.proxy.clone(),
            http_proxy: self.http_proxy.clone(),
            https_proxy: self.https_proxy.clone(),
            no_proxy: self.no_proxy.clone(),
            reject_unauthorized: self.reject_unauthorized,
            ca: read_pem("ca", self.ca.as_deref())?,
            cert: read_pem("cert", self.cert.as_deref())?,
            key: read_pem("key", self.key.as_deref())?,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.retry_delay))
    }
}

fn read_pem(field: &str, path: Option<&Path>) -> Result<Option<Vec<u8>>> {
    let Some(path) = path else {
        return Ok(None);
    };

    std::fs::read(path).map(Some).map_err(|source| ConfigError::ReadFile {
        field: field.to_string(),
        path: path.to_path_buf(),
        source,
    })
}
