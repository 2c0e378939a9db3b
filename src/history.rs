//! History persistence -- a JSON series of profile records on disk.
//!
//! Appends read the entire series, push, and rewrite the file whole. There is
//! no cross-process locking, so concurrent appends race last-write-wins;
//! single-process batch usage is the supported mode.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::report::ProfileRecord;

pub const DEFAULT_HISTORY_FILE: &str = "performance_history.json";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("history file {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode history: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("history I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// File-backed series of profile records; insertion order is chronological.
/// The same `test_file` key repeating across entries is the expected
/// longitudinal-tracking case.
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record: full read, push, full pretty-printed rewrite.
    /// An existing-but-malformed file is a hard failure, never auto-repaired.
    pub fn append(&self, record: &ProfileRecord) -> Result<(), PersistenceError> {
        let mut series = self.load_series()?;
        series.push(record.clone());
        let json = serde_json::to_string_pretty(&series)?;
        fs::write(&self.path, json).map_err(|source| PersistenceError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), total = series.len(), "History updated");
        Ok(())
    }

    /// All records for one test file, in persisted order. Missing state is an
    /// empty series, not an error.
    pub fn query(&self, test_file: &str) -> Result<Vec<ProfileRecord>, PersistenceError> {
        Ok(self
            .load_series()?
            .into_iter()
            .filter(|record| record.test_file == test_file)
            .collect())
    }

    fn load_series(&self) -> Result<Vec<ProfileRecord>, PersistenceError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(PersistenceError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_str(&text).map_err(|source| PersistenceError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }
}
