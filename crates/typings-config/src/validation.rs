//! Consistency checks that do not touch the file system.

use url::Url;

use crate::config::RcConfig;
use crate::error::{ConfigError, Result};

pub fn validate(config: &RcConfig) -> Result<()> {
    let proxies = [
        ("proxy", &config.proxy),
        ("httpProxy", &config.http_proxy),
        ("httpsProxy", &config.https_proxy),
    ];

    for (field, proxy) in proxies {
        let Some(proxy) = proxy else { continue };
        Url::parse(proxy).map_err(|err| ConfigError::InvalidValue {
            field: field.to_string(),
            message: format!("\"{proxy}\" is not a valid URL ({err})"),
        })?;
    }

    match (&config.cert, &config.key) {
        (Some(_), None) => Err(missing_pair("cert", "key")),
        (None, Some(_)) => Err(missing_pair("key", "cert")),
        _ => Ok(()),
    }
}

fn missing_pair(field: &str, other: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: format!("\"{other}\" must also be set"),
    }
}
