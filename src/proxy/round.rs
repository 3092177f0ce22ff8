//! The round loop: fetch → validate → reconcile → sleep, until cancelled

use crate::error::{ErrorSink, PersistError};
use crate::proxy::checker::Validate;
use crate::proxy::crawler::{ProxyCrawler, ProxySource};
use crate::proxy::models::RoundReport;
use crate::proxy::persistence::ActiveFile;
use crate::proxy::scheduler::Scheduler;
use crate::proxy::store::{CandidateStore, ConfirmedSet, Ingested};
use crate::Config;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Fetching,
    Validating,
    Reconciling,
    Sleeping,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Fetching => write!(f, "fetching"),
            Phase::Validating => write!(f, "validating"),
            Phase::Reconciling => write!(f, "reconciling"),
            Phase::Sleeping => write!(f, "sleeping"),
        }
    }
}

pub struct RoundLoop {
    sources: Vec<ProxySource>,
    interval: Duration,
    crawler: ProxyCrawler,
    store: CandidateStore,
    scheduler: Scheduler,
    errors: ErrorSink,
    cancel: CancellationToken,
    round: u64,
}

impl RoundLoop {
    /// Open the active file, seed the confirmed set from it and wire the
    /// pipeline. Failing to open or read the active file is the only fatal
    /// error.
    pub fn bootstrap(
        config: &Config,
        validator: Arc<dyn Validate>,
        errors: ErrorSink,
        cancel: CancellationToken,
    ) -> crate::Result<Self> {
        let active = Arc::new(ActiveFile::open(&config.active_file)?);
        let confirmed = Self::load_confirmed(&active)?;
        tracing::info!(
            path = ?active.path(),
            confirmed = confirmed.len(),
            "loaded active file"
        );

        let crawler = ProxyCrawler::with_config(config.crawler.clone())?;
        let scheduler = Scheduler::new(
            validator,
            active,
            errors.clone(),
            config.checker.concurrency,
        );

        Ok(Self {
            sources: config.sources.clone(),
            interval: config.round_interval,
            crawler,
            store: CandidateStore::new(confirmed),
            scheduler,
            errors,
            cancel,
            round: 0,
        })
    }

    fn load_confirmed(active: &ActiveFile) -> Result<ConfirmedSet, PersistError> {
        Ok(ConfirmedSet::load(active.load_all()?))
    }

    pub fn confirmed(&self) -> &ConfirmedSet {
        self.store.confirmed()
    }

    /// Run rounds until the cancellation token fires
    pub async fn run(mut self) {
        while !self.cancel.is_cancelled() {
            if self.run_round().await.is_none() {
                break;
            }

            tracing::debug!(phase = %Phase::Sleeping, secs = self.interval.as_secs_f64());
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
        tracing::info!(rounds = self.round, "round loop stopped");
    }

    /// Run one fetch → validate → reconcile cycle.
    ///
    /// Returns `None` if cancellation was observed at a phase boundary.
    pub async fn run_round(&mut self) -> Option<RoundReport> {
        self.round += 1;
        let span = tracing::info_span!("round", round = self.round);
        self.run_round_inner().instrument(span).await
    }

    async fn run_round_inner(&mut self) -> Option<RoundReport> {
        let mut report = RoundReport::new(self.round);

        tracing::debug!(phase = %Phase::Fetching, sources = self.sources.len());
        self.fetch(&mut report).await;
        if self.cancel.is_cancelled() {
            return None;
        }

        let pool = self.store.take_pending();
        tracing::debug!(phase = %Phase::Validating, pending = pool.len());
        let results = self.scheduler.run_round(pool).await;
        if self.cancel.is_cancelled() {
            return None;
        }

        tracing::debug!(phase = %Phase::Reconciling, results = results.len());
        let reconciliation = self.store.reconcile(results);
        report.confirmed = reconciliation.newly_confirmed.len();
        report.dropped = reconciliation.dropped.len();

        tracing::info!(
            started_at = %report.started_at.to_rfc3339(),
            lines = report.lines,
            ingested = report.ingested,
            already_confirmed = report.already_confirmed,
            duplicates = report.duplicates,
            rejected = report.rejected,
            failed_sources = report.failed_sources,
            confirmed = report.confirmed,
            dropped = report.dropped,
            total_confirmed = self.store.confirmed().len(),
            "round complete"
        );
        Some(report)
    }

    async fn fetch(&mut self, report: &mut RoundReport) {
        let results = self.crawler.crawl_sources_with_results(&self.sources).await;

        for result in results {
            if let Some(error) = result.error {
                report.failed_sources += 1;
                self.errors.report(error);
                continue;
            }

            let mut added = 0;
            for line in result.body.lines() {
                report.lines += 1;
                match self.store.ingest(line) {
                    Ok(Ingested::Added) => {
                        added += 1;
                        report.ingested += 1;
                    }
                    Ok(Ingested::AlreadyConfirmed) => report.already_confirmed += 1,
                    Ok(Ingested::Duplicate) => report.duplicates += 1,
                    Ok(Ingested::Blank) => {}
                    Err(err) => {
                        report.rejected += 1;
                        self.errors.report(err);
                    }
                }
            }
            tracing::debug!(source = %result.source, added, "source fetched");
        }
    }
}
