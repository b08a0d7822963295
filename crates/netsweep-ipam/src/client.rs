//! HTTP connection setup and shared IPAM client.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;

use netsweep_core::config::{ApiSettings, PublishSettings};

/// Errors from IPAM operations.
#[derive(Debug, thiserror::Error)]
pub enum IpamError {
    #[error("IPAM request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IPAM returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected IPAM response: {0}")]
    Decode(String),

    #[error("Invalid IPAM client configuration: {0}")]
    Config(String),
}

/// IPAM REST client.
///
/// Every request carries `Authorization: Token <token>` and
/// `accept: application/json`, and is bounded by `api.timeout_secs`.
/// Clone is cheap (inner Arc).
#[derive(Clone)]
pub struct IpamClient {
    pub(crate) http: Client,
    base_url: String,
    pub(crate) discovery_tag: String,
    pub(crate) publish: PublishSettings,
}

impl IpamClient {
    pub fn new(api: &ApiSettings, publish: &PublishSettings) -> Result<Self, IpamError> {
        let mut auth = HeaderValue::from_str(&format!("Token {}", api.token))
            .map_err(|e| IpamError::Config(format!("api.token: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, auth);

        let http = Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .default_headers(headers)
            .build()?;

        tracing::debug!(url_base = %api.url_base, "IPAM client ready");

        Ok(Self {
            http,
            base_url: api.url_base.trim_end_matches('/').to_string(),
            discovery_tag: api.discovery_tag.clone(),
            publish: publish.clone(),
        })
    }

    /// Absolute URL for an API path such as `/api/ipam/prefixes/`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-2xx response into [`IpamError::Status`].
    pub(crate) async fn check_status(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, IpamError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(IpamError::Status {
            status: status.as_u16(),
            body,
        })
    }
}
