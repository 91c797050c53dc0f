//! HTTP health probe.
//!
//! # Responsibilities
//! - GET a probe path under the environment's base URL
//! - Present credentials according to the environment's auth mode
//! - Map transport errors and non-2xx statuses to probe failure

use futures_util::future::BoxFuture;
use url::Url;

use crate::config::{AuthMode, EnvironmentConfig};
use crate::error::BoxError;
use crate::health::ProbeTransport;

const DEFAULT_PROBE_PATH: &str = "/health";
const PROBE_USER_AGENT: &str = "env-failover-probe";
const DEFAULT_API_KEY_HEADER: &str = "x-api-key";

/// [`ProbeTransport`] implementation over a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    probe_path: String,
}

impl HttpProbe {
    pub fn new() -> Self {
        Self::with_path(DEFAULT_PROBE_PATH)
    }

    /// Probe a custom path instead of `/health`.
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            probe_path: path.into(),
        }
    }

    fn probe_url(&self, base_url: &str) -> Result<Url, BoxError> {
        let base = Url::parse(base_url)?;
        Ok(base.join(&self.probe_path)?)
    }
}

impl Default for HttpProbe {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_auth(
    request: reqwest::RequestBuilder,
    config: &EnvironmentConfig,
) -> reqwest::RequestBuilder {
    let key_header = config
        .custom_header
        .as_deref()
        .unwrap_or(DEFAULT_API_KEY_HEADER);

    match (config.auth_mode, &config.bearer_token) {
        (AuthMode::ApiKey, _) => request.header(key_header, config.api_key.as_str()),
        (AuthMode::Bearer, Some(token)) => request.bearer_auth(token),
        (AuthMode::Bearer, None) => request,
        (AuthMode::PreferBearer, Some(token)) => request.bearer_auth(token),
        (AuthMode::PreferBearer, None) => request.header(key_header, config.api_key.as_str()),
    }
}

impl ProbeTransport for HttpProbe {
    fn probe(&self, config: &EnvironmentConfig) -> BoxFuture<'static, Result<(), BoxError>> {
        let url = self.probe_url(&config.base_url);
        let client = self.client.clone();
        let config = config.clone();

        Box::pin(async move {
            let request = client.get(url?).header("user-agent", PROBE_USER_AGENT);
            let response = apply_auth(request, &config).send().await?;

            if response.status().is_success() {
                Ok(())
            } else {
                Err(format!("probe returned status {}", response.status()).into())
            }
        })
    }
}
