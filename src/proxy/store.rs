//! Candidate store: the confirmed set and the per-round pending pool

use crate::error::ParseError;
use crate::proxy::models::{Candidate, CandidateKey, Status};
use crate::proxy::parser::{self, ProxyParser};
use std::collections::HashSet;

/// Keys already proven functional; suppresses re-testing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfirmedSet {
    keys: HashSet<CandidateKey>,
}

impl ConfirmedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the set from durable `host:port` lines, ignoring malformed ones
    pub fn load<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys = lines
            .into_iter()
            .filter_map(|line| ProxyParser::parse_durable(line.as_ref()))
            .map(|candidate| candidate.key())
            .collect();
        Self { keys }
    }

    pub fn contains(&self, key: &CandidateKey) -> bool {
        self.keys.contains(key)
    }

    /// Returns `false` if the key was already present
    pub fn insert(&mut self, key: CandidateKey) -> bool {
        self.keys.insert(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Outcome of ingesting one raw line into the pending pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ingested {
    Added,
    Blank,
    AlreadyConfirmed,
    Duplicate,
}

/// Partition of a validated batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub newly_confirmed: Vec<Candidate>,
    pub dropped: Vec<Candidate>,
}

/// Split a validated batch into confirmed and dropped candidates.
///
/// Anything that did not end `Confirmed` (including a candidate still
/// `Untested` because its validation never produced a verdict) is dropped.
pub fn reconcile(results: Vec<Candidate>) -> Reconciliation {
    let (newly_confirmed, dropped) = results
        .into_iter()
        .partition(|c| c.status == Status::Confirmed && c.is_confirmed());
    Reconciliation {
        newly_confirmed,
        dropped,
    }
}

/// In-memory candidate collection for the round loop
#[derive(Debug, Default)]
pub struct CandidateStore {
    confirmed: ConfirmedSet,
    pending: Vec<Candidate>,
    pending_keys: HashSet<CandidateKey>,
}

impl CandidateStore {
    pub fn new(confirmed: ConfirmedSet) -> Self {
        Self {
            confirmed,
            pending: Vec::new(),
            pending_keys: HashSet::new(),
        }
    }

    pub fn confirmed(&self) -> &ConfirmedSet {
        &self.confirmed
    }

    pub fn pending(&self) -> &[Candidate] {
        &self.pending
    }

    /// Parse `line` and admit it to the pending pool unless it is confirmed
    /// or already pending this round.
    pub fn ingest(&mut self, line: &str) -> Result<Ingested, ParseError> {
        if line.trim().is_empty() {
            return Ok(Ingested::Blank);
        }

        let Some(candidate) = parser::ingest(line, &self.confirmed)? else {
            return Ok(Ingested::AlreadyConfirmed);
        };

        if !self.pending_keys.insert(candidate.key()) {
            return Ok(Ingested::Duplicate);
        }

        self.pending.push(candidate);
        Ok(Ingested::Added)
    }

    /// Hand the pending pool to the scheduler, leaving the store empty
    pub fn take_pending(&mut self) -> Vec<Candidate> {
        self.pending_keys.clear();
        std::mem::take(&mut self.pending)
    }

    /// Fold a validated batch into the confirmed set and reset the pool
    pub fn reconcile(&mut self, results: Vec<Candidate>) -> Reconciliation {
        let reconciliation = reconcile(results);
        for candidate in &reconciliation.newly_confirmed {
            self.confirmed.insert(candidate.key());
        }
        self.pending.clear();
        self.pending_keys.clear();
        reconciliation
    }
}
