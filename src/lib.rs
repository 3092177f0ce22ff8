//! Proxy Harvester
//!
//! Continuously pulls public proxy lists, validates every new entry by
//! fetching a known resource through it, and appends the working ones to an
//! active file that also keeps them from being tested again.

pub mod error;
pub mod logging;
pub mod proxy;

pub use error::{ErrorSink, PipelineError};
pub use proxy::*;

use std::path::PathBuf;
use std::time::Duration;

/// Application result type
pub type Result<T> = anyhow::Result<T>;

/// Default pause between rounds in seconds
const DEFAULT_ROUND_INTERVAL_SECS: u64 = 10;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Append-only file of confirmed proxies
    pub active_file: PathBuf,
    /// Pause between rounds
    pub round_interval: Duration,
    /// Lists fetched at the start of every round
    pub sources: Vec<ProxySource>,
    pub checker: CheckerConfig,
    pub crawler: CrawlerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            active_file: PathBuf::from("active.txt"),
            round_interval: Duration::from_secs(DEFAULT_ROUND_INTERVAL_SECS),
            sources: ProxyCrawler::get_common_sources(),
            checker: CheckerConfig::default(),
            crawler: CrawlerConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_active_file(mut self, path: PathBuf) -> Self {
        self.active_file = path;
        self
    }

    pub fn with_round_interval(mut self, interval: Duration) -> Self {
        self.round_interval = interval;
        self
    }

    pub fn with_sources(mut self, sources: Vec<ProxySource>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_checker(mut self, checker: CheckerConfig) -> Self {
        self.checker = checker;
        self
    }

    pub fn with_crawler(mut self, crawler: CrawlerConfig) -> Self {
        self.crawler = crawler;
        self
    }
}
