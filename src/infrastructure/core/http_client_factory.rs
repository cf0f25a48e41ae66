use anyhow::{Context, Result};
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::time::Duration;
use url::Url;

/// Timeouts and retry budget for outbound feed requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpClientSettings {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub max_retries: u32,
}

impl Default for HttpClientSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_retries: 3,
        }
    }
}

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// HTTP client with exponential-backoff retries on transient failures.
    pub fn create_client(settings: HttpClientSettings) -> ClientWithMiddleware {
        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(settings.max_retries);

        let client = Client::builder()
            .user_agent(concat!("marketpulse/", env!("CARGO_PKG_VERSION")))
            .pool_max_idle_per_host(5)
            .timeout(settings.timeout)
            .connect_timeout(settings.connect_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build()
    }
}

/// `base_url` with `params` appended as an encoded query string.
///
/// reqwest-middleware's request builder has no `.query()`, so the URL is
/// assembled up front.
pub fn build_url_with_query<K, V>(base_url: &str, params: &[(K, V)]) -> Result<Url>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    Url::parse_with_params(
        base_url,
        params.iter().map(|(k, v)| (k.as_ref(), v.as_ref())),
    )
    .with_context(|| format!("Invalid base URL: {}", base_url))
}
