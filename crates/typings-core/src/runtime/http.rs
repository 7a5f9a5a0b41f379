//! Remote read capability.

use async_trait::async_trait;
use reqwest::{Certificate, Client, Identity, NoProxy, Proxy};

use crate::constants::{PROJECT_NAME, VERSION};
use crate::error::{Error, FetchError};

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Performs a single GET request. Retrying is the caller's concern.
#[async_trait]
pub trait HttpClient: Send + Sync + std::fmt::Debug {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError>;
}

/// Connection settings for [`ReqwestClient`].
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub user_agent: Option<String>,
    /// Proxy used for every scheme unless a scheme specific one is set.
    pub proxy: Option<String>,
    pub http_proxy: Option<String>,
    pub https_proxy: Option<String>,
    pub no_proxy: Option<String>,
    pub reject_unauthorized: bool,
    /// PEM encoded certificate authority.
    pub ca: Option<Vec<u8>>,
    /// PEM encoded client certificate and key.
    pub cert: Option<Vec<u8>>,
    pub key: Option<Vec<u8>>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            user_agent: None,
            proxy: None,
            http_proxy: None,
            https_proxy: None,
            no_proxy: None,
            reject_unauthorized: true,
            ca: None,
            cert: None,
            key: None,
        }
    }
}

/// Default `User-Agent` header.
pub fn default_user_agent() -> String {
    format!(
        "{PROJECT_NAME}/{VERSION} {} {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// [`HttpClient`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    pub fn new(options: &HttpOptions) -> Result<Self, Error> {
        let user_agent = options.user_agent.clone().unwrap_or_else(default_user_agent);
        let mut builder = Client::builder()
            .user_agent(user_agent)
            .danger_accept_invalid_certs(!options.reject_unauthorized);

        let no_proxy = options.no_proxy.as_deref().and_then(NoProxy::from_string);
        let proxies = [
            (options.http_proxy.as_deref().or(options.proxy.as_deref()), ProxyKind::Http),
            (options.https_proxy.as_deref().or(options.proxy.as_deref()), ProxyKind::Https),
        ];
        for (url, kind) in proxies {
            let Some(url) = url else { continue };
            let proxy = match kind {
                ProxyKind::Http => Proxy::http(url),
                ProxyKind::Https => Proxy::https(url),
            }
            .map_err(|e| Error::HttpClient(format!("invalid proxy \"{url}\": {e}")))?;
            builder = builder.proxy(proxy.no_proxy(no_proxy.clone()));
        }

        if let Some(ca) = &options.ca {
            let certificate = Certificate::from_pem(ca)
                .map_err(|e| Error::HttpClient(format!("invalid certificate authority: {e}")))?;
            builder = builder.add_root_certificate(certificate);
        }

        if let (Some(cert), Some(key)) = (&options.cert, &options.key) {
            let pem = [cert.as_slice(), &b"\n"[..], key.as_slice()].concat();
            let identity = Identity::from_pem(&pem)
                .map_err(|e| Error::HttpClient(format!("invalid client certificate: {e}")))?;
            builder = builder.identity(identity);
        }

        let client = builder
            .build()
            .map_err(|e| Error::HttpClient(e.to_string()))?;

        Ok(Self { client })
    }
}

#[derive(Clone, Copy)]
enum ProxyKind {
    Http,
    Https,
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport)?;

        Ok(HttpResponse { status, body })
    }
}
