//! Bounded fan-out of validations over a round's pending pool

use crate::error::ErrorSink;
use crate::proxy::checker::Validate;
use crate::proxy::models::{Candidate, Status};
use crate::proxy::persistence::ActiveFile;
use futures::stream::{self, StreamExt};
use std::sync::Arc;

/// Runs one validation per candidate with at most `concurrency` in flight
pub struct Scheduler {
    validator: Arc<dyn Validate>,
    active: Arc<ActiveFile>,
    errors: ErrorSink,
    concurrency: usize,
}

impl Scheduler {
    pub fn new(
        validator: Arc<dyn Validate>,
        active: Arc<ActiveFile>,
        errors: ErrorSink,
        concurrency: usize,
    ) -> Self {
        Self {
            validator,
            active,
            errors,
            concurrency: concurrency.max(1),
        }
    }

    /// Validate the whole pool and return every candidate with its verdict.
    ///
    /// Candidates already confirmed are never re-validated and are left out
    /// of the result. Returns only after all validations have finished. Each task owns its
    /// candidate and hands it back; a confirmed candidate is appended to the
    /// active file before it is returned. Write failures are reported on the
    /// error channel and leave the verdict untouched.
    pub async fn run_round(&self, pool: Vec<Candidate>) -> Vec<Candidate> {
        stream::iter(pool.into_iter().filter(|c| !c.is_confirmed()))
            .map(|candidate| self.check(candidate))
            .buffer_unordered(self.concurrency)
            .collect::<Vec<_>>()
            .await
    }

    async fn check(&self, candidate: Candidate) -> Candidate {
        let status = self.validator.validate(&candidate).await;
        let candidate = candidate.with_status(status);

        if status == Status::Confirmed {
            if let Err(err) = self.active.append(&candidate).await {
                self.errors.report(err);
            }
        }

        candidate
    }
}
