//! Proxy harvesting pipeline
//!
//! - Fetching raw `host:port` lists from public sources
//! - Parsing lines into candidates and deduplicating against confirmed ones
//! - Validating candidates through a bounded worker pool
//! - Recording confirmed proxies in an append-only file

pub mod checker;
pub mod crawler;
pub mod models;
pub mod parser;
pub mod persistence;
pub mod round;
pub mod scheduler;
pub mod store;

pub use checker::{CheckerConfig, ProxyChecker, Validate};
pub use crawler::{CrawlResult, CrawlerConfig, ProxyCrawler, ProxySource};
pub use models::{Candidate, CandidateKey, RoundReport, Status};
pub use parser::{ingest, ProxyParser};
pub use persistence::ActiveFile;
pub use round::{Phase, RoundLoop};
pub use scheduler::Scheduler;
pub use store::{reconcile, CandidateStore, ConfirmedSet, Ingested, Reconciliation};
