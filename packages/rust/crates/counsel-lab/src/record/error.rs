//! Error types for turn log persistence.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    /// Local file could not be created, read or appended.
    #[error("turn log I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode turn record: {0}")]
    Encode(#[from] serde_json::Error),

    /// Remote table insert failed (transport or non-success status).
    #[error("remote log insert failed: {0}")]
    Remote(String),

    #[error("failed to write export file {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("export task did not finish: {0}")]
    Task(String),
}

impl RecordError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
