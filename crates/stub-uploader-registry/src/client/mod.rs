//! HTTP client for the PyPI JSON API with retry logic

use std::time::Duration;

use reqwest::{Client, ClientBuilder, StatusCode};
use tracing::{debug, warn};
use url::Url;

use stub_uploader_core::error::StubError;
use stub_uploader_core::types::canonical_name;

use crate::api::{ProjectLookup, ProjectResponse};
use crate::RegistryResult;

/// Default package index
pub const DEFAULT_INDEX_URL: &str = "https://pypi.org";

/// Configuration for exponential backoff retry logic
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Delay that follows `delay` under exponential backoff
    fn next_delay(&self, delay: Duration) -> Duration {
        let next = Duration::from_millis((delay.as_millis() as f64 * self.multiplier) as u64);
        std::cmp::min(next, self.max_delay)
    }
}

/// Client for the PyPI JSON API
#[derive(Debug, Clone)]
pub struct PypiClient {
    /// Underlying HTTP client with connection pooling
    client: Client,
    /// Retry configuration
    retry_config: RetryConfig,
    /// Base index URL, without a trailing slash
    base_url: String,
}

impl PypiClient {
    /// Create a client for pypi.org with default retries
    pub fn new() -> RegistryResult<Self> {
        Self::with_config(DEFAULT_INDEX_URL, RetryConfig::default())
    }

    /// Create a client for another index or retry policy
    pub fn with_config(base_url: &str, retry_config: RetryConfig) -> RegistryResult<Self> {
        Url::parse(base_url).map_err(|e| StubError::ConfigValidation {
            field: "index_url".to_string(),
            reason: format!("'{}' is not a URL: {}", base_url, e),
        })?;

        let client = ClientBuilder::new()
            // Connection pooling configuration
            .pool_max_idle_per_host(8)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(Duration::from_secs(30))
            .gzip(true)
            .user_agent(concat!("stub-uploader/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StubError::network(format!("Failed to create HTTP client: {}", e), e))?;

        Ok(Self {
            client,
            retry_config,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    /// JSON API URL of `project`
    pub fn project_url(&self, project: &str) -> String {
        format!("{}/pypi/{}/json", self.base_url, canonical_name(project))
    }

    /// Execute an operation with exponential backoff retry logic
    async fn with_retry<F, Fut, T>(&self, operation: F) -> RegistryResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = RegistryResult<T>>,
    {
        let mut delay = self.retry_config.initial_delay;
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(error) if error.is_recoverable() && attempt < self.retry_config.max_retries => {
                    attempt += 1;
                    warn!(
                        "{} (attempt {}/{}), retrying in {:?}",
                        error, attempt, self.retry_config.max_retries, delay
                    );
                    tokio::time::sleep(delay).await;
                    delay = self.retry_config.next_delay(delay);
                },
                Err(error) => return Err(error),
            }
        }
    }

    /// Fetch the JSON document of `project`; `None` when the index answers 404
    pub async fn fetch_project(&self, project: &str) -> RegistryResult<Option<ProjectResponse>> {
        let url = self.project_url(project);
        debug!("Fetching {}", url);

        self.with_retry(|| async {
            let response = self
                .client
                .get(&url)
                .header("Accept", "application/json")
                .send()
                .await
                .map_err(|e| StubError::network(format!("Failed to fetch {}: {}", url, e), e))?;

            match response.status() {
                StatusCode::OK => {
                    let project = response
                        .json::<ProjectResponse>()
                        .await
                        .map_err(|e| StubError::network(format!("Failed to parse {}: {}", url, e), e))?;
                    Ok(Some(project))
                },
                StatusCode::NOT_FOUND => Ok(None),
                status => Err(StubError::Network {
                    message: format!("Index returned status {} for {}", status, url),
                    source: None,
                }),
            }
        })
        .await
    }

    /// Runtime requirements of `project` as published on the index
    pub async fn lookup(&self, project: &str) -> RegistryResult<ProjectLookup> {
        Ok(self.fetch_project(project).await?.into())
    }
}
