//! Error taxonomy for the harvesting pipeline
//!
//! Every variant except a [`PersistError`] raised while opening the active
//! file is recovered inside the phase that produced it and only reported on
//! the error channel.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::mpsc;

/// A source line that could not become a candidate
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line carries a provider error marker: {0}")]
    ErrorMarker(String),
    #[error("line has no host:port separator: {0}")]
    MissingSeparator(String),
    #[error("line has an empty host or port: {0}")]
    EmptyField(String),
}

/// A source feed that contributed nothing this round
#[derive(Debug, Error)]
pub enum SourceFetchError {
    #[error("request to {source_name} failed: {error}")]
    Request {
        source_name: String,
        #[source]
        error: reqwest::Error,
    },
    #[error("{source_name} answered with HTTP status {status}")]
    Status { source_name: String, status: u16 },
}

/// Why a probe through a candidate did not confirm it
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid proxy address: {0}")]
    Proxy(#[source] reqwest::Error),
    #[error("connection failed: {0}")]
    Connect(#[source] reqwest::Error),
    #[error("probe timed out")]
    Timeout,
    #[error("failed to read response body: {0}")]
    Read(#[source] reqwest::Error),
    #[error("unexpected response body: {0:?}")]
    BodyMismatch(String),
}

/// Durable store failures
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("cannot open active file {path:?}: {error}")]
    Open {
        path: PathBuf,
        #[source]
        error: io::Error,
    },
    #[error("cannot read active file {path:?}: {error}")]
    Read {
        path: PathBuf,
        #[source]
        error: io::Error,
    },
    #[error("failed to append {line} to the active file: {error}")]
    Write {
        line: String,
        #[source]
        error: io::Error,
    },
}

/// Non-fatal event carried on the error channel
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    SourceFetch(#[from] SourceFetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Persistence(#[from] PersistError),
}

/// Sending half of the error channel
#[derive(Debug, Clone)]
pub struct ErrorSink {
    tx: mpsc::UnboundedSender<PipelineError>,
}

impl ErrorSink {
    pub fn new(tx: mpsc::UnboundedSender<PipelineError>) -> Self {
        Self { tx }
    }

    /// Create a sink together with its receiving half
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PipelineError>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Report an event. A closed channel is ignored.
    pub fn report(&self, error: impl Into<PipelineError>) {
        let _ = self.tx.send(error.into());
    }
}

/// Drain the error channel into the log until every sink is dropped
pub fn spawn_error_logger(
    mut rx: mpsc::UnboundedReceiver<PipelineError>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match &event {
                PipelineError::Parse(ParseError::ErrorMarker(line)) => {
                    tracing::warn!(line = %line, "discarding provider error line");
                }
                PipelineError::Parse(err) => tracing::debug!(error = %err, "skipping line"),
                PipelineError::SourceFetch(err) => tracing::error!(error = %err, "source fetch failed"),
                PipelineError::Persistence(err) => tracing::error!(error = %err, "persistence failed"),
            }
        }
    })
}
