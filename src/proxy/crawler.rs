//! Proxy crawler module for fetching raw proxy lists
//!
//! Each source is a URL serving newline-separated `host:port` text. The
//! crawler only retrieves bodies; turning lines into candidates is the
//! parser's job.

use crate::error::SourceFetchError;
use crate::Result;
use reqwest::Client;
use std::time::Duration;

/// Default timeout for HTTP requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default user agent for HTTP requests
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Result of fetching a single source
#[derive(Debug)]
pub struct CrawlResult {
    /// The source that was fetched
    pub source: String,
    /// Raw body text, empty on failure
    pub body: String,
    pub error: Option<SourceFetchError>,
}

impl CrawlResult {
    pub fn success(source: String, body: String) -> Self {
        Self {
            source,
            body,
            error: None,
        }
    }

    pub fn failure(source: String, error: SourceFetchError) -> Self {
        Self {
            source,
            body: String::new(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Configuration for proxy crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Timeout for HTTP requests
    pub timeout: Duration,
    /// User agent for HTTP requests
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CrawlerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }
}

/// A URL serving a proxy list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySource {
    /// Name used in logs
    pub name: String,
    pub url: String,
}

impl ProxySource {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    /// Source named after its URL
    pub fn from_url(url: &str) -> Self {
        Self::new(url, url)
    }
}

/// Proxy crawler for fetching proxy lists
pub struct ProxyCrawler {
    client: Client,
}

impl ProxyCrawler {
    /// Create a new proxy crawler with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(CrawlerConfig::default())
    }

    /// Create a new proxy crawler with custom configuration
    pub fn with_config(config: CrawlerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { client })
    }

    /// Fetch the raw body of one source. Non-2xx statuses are errors.
    pub async fn fetch_source(&self, source: &ProxySource) -> std::result::Result<String, SourceFetchError> {
        let request_error = |error| SourceFetchError::Request {
            source_name: source.name.clone(),
            error,
        };

        let response = self
            .client
            .get(&source.url)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceFetchError::Status {
                source_name: source.name.clone(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(request_error)
    }

    /// Fetch every source in order, returning a result for each
    pub async fn crawl_sources_with_results(&self, sources: &[ProxySource]) -> Vec<CrawlResult> {
        let mut results = Vec::new();

        for source in sources {
            let result = match self.fetch_source(source).await {
                Ok(body) => CrawlResult::success(source.name.clone(), body),
                Err(e) => CrawlResult::failure(source.name.clone(), e),
            };
            results.push(result);
        }

        results
    }

    /// Public plain-text lists polled by default
    pub fn get_common_sources() -> Vec<ProxySource> {
        [
            "https://www.proxyscan.io/download?type=http",
            "https://www.proxyscan.io/download?type=https",
            "https://api.proxyscrape.com/?request=getproxies&proxytype=all&timeout=10000000&country=all&anonymity=all",
            "https://api.proxyscrape.com/?request=getproxies&proxytype=https&timeout=5000&country=all&ssl=all&anonymity=all",
            "https://api.proxyscrape.com/?request=getproxies&proxytype=http&timeout=5000&country=all&ssl=all&anonymity=all",
            "https://raw.githubusercontent.com/clarketm/proxy-list/master/proxy-list-raw.txt",
            "https://raw.githubusercontent.com/TheSpeedX/PROXY-List/master/http.txt",
            "https://raw.githubusercontent.com/TheSpeedX/PROXY-List/master/socks4.txt",
            "https://raw.githubusercontent.com/TheSpeedX/PROXY-List/master/socks5.txt",
            "https://raw.githubusercontent.com/mertguvencli/http-proxy-list/main/proxy-list/data.txt",
            "https://raw.githubusercontent.com/ShiftyTR/Proxy-List/master/proxy.txt",
            "https://raw.githubusercontent.com/proxy4parsing/proxy-list/main/http.txt",
            "https://raw.githubusercontent.com/caliphdev/Proxy-List/master/http.txt",
            "https://raw.githubusercontent.com/caliphdev/Proxy-List/master/socks5.txt",
        ]
        .into_iter()
        .map(ProxySource::from_url)
        .collect()
    }

    /// Read source URLs from text, one per line; blanks and `#` comments skipped
    pub fn parse_source_list(content: &str) -> Vec<ProxySource> {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(ProxySource::from_url)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_crawler_config_default() {
        let config = CrawlerConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_crawler_config_builder() {
        let config = CrawlerConfig::new()
            .with_timeout(Duration::from_secs(60))
            .with_user_agent("Custom Agent".to_string());

        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.user_agent, "Custom Agent");
    }

    #[test]
    fn test_get_common_sources() {
        let sources = ProxyCrawler::get_common_sources();
        assert_eq!(sources.len(), 14);
        for source in &sources {
            assert!(!source.name.is_empty());
            assert!(source.url.starts_with("https://"));
        }
    }

    #[test]
    fn test_parse_source_list() {
        let content = r#"
# free lists
https://example.com/a.txt

  https://example.com/b.txt
"#;
        let sources = ProxyCrawler::parse_source_list(content);
        assert_eq!(
            sources,
            vec![
                ProxySource::from_url("https://example.com/a.txt"),
                ProxySource::from_url("https://example.com/b.txt"),
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_source_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/http.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("1.2.3.4:8080\n"))
            .mount(&server)
            .await;

        let crawler = ProxyCrawler::new().unwrap();
        let source = ProxySource::from_url(&format!("{}/http.txt", server.uri()));
        let body = crawler.fetch_source(&source).await.unwrap();
        assert_eq!(body, "1.2.3.4:8080\n");
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let crawler = ProxyCrawler::new().unwrap();
        let sources = vec![ProxySource::new("down", &format!("{}/down", server.uri()))];
        let results = crawler.crawl_sources_with_results(&sources).await;

        assert_eq!(results.len(), 1);
        assert!(!results[0].is_success());
        assert!(results[0].body.is_empty());
        assert!(matches!(
            results[0].error,
            Some(SourceFetchError::Status { status: 503, .. })
        ));
    }
}
