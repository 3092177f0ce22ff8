//! Candidate data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validation lifecycle of a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Status {
    #[default]
    Untested,
    Invalid,
    Confirmed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Untested => write!(f, "untested"),
            Status::Invalid => write!(f, "invalid"),
            Status::Confirmed => write!(f, "confirmed"),
        }
    }
}

/// Identity of a candidate: the exact `host` and `port` text, no normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateKey {
    pub host: String,
    pub port: String,
}

impl CandidateKey {
    pub fn new(host: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: port.into(),
        }
    }
}

impl fmt::Display for CandidateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// A proxy endpoint awaiting (or carrying) a validation verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub host: String,
    pub port: String,
    pub status: Status,
    pub confirmed: bool,
}

impl Candidate {
    /// Create a fresh, untested candidate
    pub fn new(host: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: port.into(),
            status: Status::Untested,
            confirmed: false,
        }
    }

    pub fn key(&self) -> CandidateKey {
        CandidateKey::new(self.host.clone(), self.port.clone())
    }

    /// Consume the candidate and return it carrying `status`.
    ///
    /// `confirmed` follows the status, so a `Confirmed` candidate is always
    /// flagged and nothing else is.
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self.confirmed = status == Status::Confirmed;
        self
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    /// Forward proxy URL used to route probes through this candidate
    pub fn proxy_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// The durable `host:port` line for this candidate
    pub fn to_line(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Summary of one fetch → validate → reconcile cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundReport {
    pub round: u64,
    pub started_at: DateTime<Utc>,
    /// Raw lines read from all feeds
    pub lines: usize,
    /// Candidates admitted to the pending pool
    pub ingested: usize,
    /// Lines whose key was already confirmed
    pub already_confirmed: usize,
    /// Lines repeating a key already pending this round
    pub duplicates: usize,
    /// Lines rejected by the parser
    pub rejected: usize,
    pub failed_sources: usize,
    pub confirmed: usize,
    pub dropped: usize,
}

impl RoundReport {
    pub fn new(round: u64) -> Self {
        Self {
            round,
            started_at: Utc::now(),
            lines: 0,
            ingested: 0,
            already_confirmed: 0,
            duplicates: 0,
            rejected: 0,
            failed_sources: 0,
            confirmed: 0,
            dropped: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_creation() {
        let candidate = Candidate::new("127.0.0.1", "8080");
        assert_eq!(candidate.host, "127.0.0.1");
        assert_eq!(candidate.port, "8080");
        assert_eq!(candidate.status, Status::Untested);
        assert!(!candidate.confirmed);
    }

    #[test]
    fn test_with_status_tracks_confirmed_flag() {
        let candidate = Candidate::new("127.0.0.1", "8080").with_status(Status::Confirmed);
        assert!(candidate.is_confirmed());

        let candidate = candidate.with_status(Status::Invalid);
        assert_eq!(candidate.status, Status::Invalid);
        assert!(!candidate.is_confirmed());
    }

    #[test]
    fn test_key_is_exact_pair() {
        let a = Candidate::new("1.2.3.4", "80").key();
        let b = Candidate::new("1.2.3.48", "0").key();
        assert_ne!(a, b);
        assert_ne!(CandidateKey::new("Host", "80"), CandidateKey::new("host", "80"));
        assert_eq!(a.to_string(), "1.2.3.4:80");
    }

    #[test]
    fn test_proxy_url_and_line() {
        let candidate = Candidate::new("10.0.0.1", "3128");
        assert_eq!(candidate.proxy_url(), "http://10.0.0.1:3128");
        assert_eq!(candidate.to_line(), "10.0.0.1:3128");
    }
}
