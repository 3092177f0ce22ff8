//! Proxy checker module for validating candidates

use crate::error::ValidationError;
use crate::proxy::models::{Candidate, Status};
use async_trait::async_trait;
use reqwest::{Client, Proxy as ReqwestProxy, Response};
use std::time::Duration;
use tokio::time::timeout;

/// Default per-attempt timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 2;

/// Default ceiling on concurrent probes
const DEFAULT_CONCURRENCY: usize = 64;

/// Liveness resource, tried over TLS first
const DEFAULT_SECURE_URL: &str =
    "https://raw.githubusercontent.com/wildy2832/testconnection/main/test.txt";

/// Plaintext variant of the same resource
const DEFAULT_PLAIN_URL: &str =
    "http://raw.githubusercontent.com/wildy2832/testconnection/main/test.txt";

/// Exact body the liveness resource serves
const DEFAULT_SENTINEL: &str = "TEST KONEKSI BERHASIL";

/// Configuration for proxy checker
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Timeout for each probe attempt
    pub timeout: Duration,
    /// Maximum number of probes in flight
    pub concurrency: usize,
    /// Liveness URL tried first
    pub secure_url: String,
    /// Liveness URL tried after a connection-level failure
    pub plain_url: String,
    /// Expected response body after trimming
    pub sentinel: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concurrency: DEFAULT_CONCURRENCY,
            secure_url: DEFAULT_SECURE_URL.to_string(),
            plain_url: DEFAULT_PLAIN_URL.to_string(),
            sentinel: DEFAULT_SENTINEL.to_string(),
        }
    }
}

impl CheckerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_secure_url(mut self, url: String) -> Self {
        self.secure_url = url;
        self
    }

    pub fn with_plain_url(mut self, url: String) -> Self {
        self.plain_url = url;
        self
    }

    pub fn with_sentinel(mut self, sentinel: String) -> Self {
        self.sentinel = sentinel;
        self
    }
}

/// Produces a verdict for one candidate.
///
/// Implementations must not persist anything; the verdict is their only output.
#[async_trait]
pub trait Validate: Send + Sync {
    async fn validate(&self, candidate: &Candidate) -> Status;
}

/// Validator probing the liveness resource through each candidate
#[derive(Debug, Clone, Default)]
pub struct ProxyChecker {
    config: CheckerConfig,
}

impl ProxyChecker {
    /// Create a new proxy checker with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new proxy checker with custom configuration
    pub fn with_config(config: CheckerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Probe the liveness resource through `candidate`.
    ///
    /// The secure URL is tried first; any transport failure (refused, reset,
    /// tunnel rejected, timeout) falls back once to the plain URL. A response
    /// that arrives is never retried, whatever its status.
    pub async fn probe(&self, candidate: &Candidate) -> Result<(), ValidationError> {
        let client = self.create_client(candidate)?;

        let response = match self.send(&client, &self.config.secure_url).await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(
                    host = %candidate.host,
                    port = %candidate.port,
                    error = %err,
                    "secure probe failed, falling back to plaintext"
                );
                self.send(&client, &self.config.plain_url).await?
            }
        };

        let body = timeout(self.config.timeout, response.text())
            .await
            .map_err(|_| ValidationError::Timeout)?
            .map_err(ValidationError::Read)?;

        let body = body.trim();
        if body == self.config.sentinel {
            Ok(())
        } else {
            Err(ValidationError::BodyMismatch(body.chars().take(64).collect()))
        }
    }

    async fn send(&self, client: &Client, url: &str) -> Result<Response, ValidationError> {
        match timeout(self.config.timeout, client.get(url).send()).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(ValidationError::Connect(e)),
            Err(_) => Err(ValidationError::Timeout),
        }
    }

    /// Create a reqwest client routed through the candidate
    fn create_client(&self, candidate: &Candidate) -> Result<Client, ValidationError> {
        let proxy = ReqwestProxy::all(candidate.proxy_url()).map_err(ValidationError::Proxy)?;

        Client::builder()
            .proxy(proxy)
            .timeout(self.config.timeout)
            .build()
            .map_err(ValidationError::Proxy)
    }
}

#[async_trait]
impl Validate for ProxyChecker {
    async fn validate(&self, candidate: &Candidate) -> Status {
        match self.probe(candidate).await {
            Ok(()) => {
                tracing::debug!(host = %candidate.host, port = %candidate.port, "proxy is valid");
                Status::Confirmed
            }
            Err(err) => {
                tracing::debug!(
                    host = %candidate.host,
                    port = %candidate.port,
                    error = %err,
                    "proxy is invalid"
                );
                Status::Invalid
            }
        }
    }
}
