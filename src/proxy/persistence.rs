//! Append-only record of confirmed proxies

use crate::error::PersistError;
use crate::proxy::models::Candidate;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// The active file: one `host:port` line per confirmed proxy.
///
/// Writes are serialized so concurrent validation tasks never interleave
/// partial lines. Nothing is ever removed from the file.
#[derive(Debug)]
pub struct ActiveFile {
    path: PathBuf,
    file: Mutex<File>,
}

impl ActiveFile {
    /// Open (creating if needed) the active file in append mode
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PersistError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|error| PersistError::Open {
                path: path.clone(),
                error,
            })?;

        Ok(Self {
            path,
            file: Mutex::new(File::from_std(file)),
        })
    }

    /// Handle whose appends always fail
    #[cfg(test)]
    pub(crate) fn read_only<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let file = std::fs::File::open(&path).expect("open read-only");
        Self {
            path,
            file: Mutex::new(File::from_std(file)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every line recorded so far.
    ///
    /// Lines that are not valid UTF-8 (e.g. a torn write) are skipped, so a
    /// damaged line never keeps the file from loading.
    pub fn load_all(&self) -> Result<Vec<String>, PersistError> {
        let content = std::fs::read(&self.path).map_err(|error| PersistError::Read {
            path: self.path.clone(),
            error,
        })?;

        let lines = content
            .split(|byte| *byte == b'\n')
            .filter(|line| !line.is_empty())
            .filter_map(|line| match std::str::from_utf8(line) {
                Ok(line) => Some(line.trim_end_matches('\r').to_string()),
                Err(_) => {
                    tracing::warn!(path = ?self.path, "skipping non-UTF-8 line in active file");
                    None
                }
            })
            .collect();
        Ok(lines)
    }

    /// Durably append one confirmed candidate
    pub async fn append(&self, candidate: &Candidate) -> Result<(), PersistError> {
        let line = candidate.to_line();
        let record = format!("{}\n", line);

        let mut file = self.file.lock().await;
        let written = async {
            file.write_all(record.as_bytes()).await?;
            file.flush().await
        }
        .await;

        written.map_err(|error| PersistError::Write { line, error })
    }
}
