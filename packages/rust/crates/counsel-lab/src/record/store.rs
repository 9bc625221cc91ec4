//! Turn log store: in-memory list, durable JSONL file, optional remote mirror.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tokio::io::AsyncWriteExt;

use crate::observability::LabEvent;

use super::error::RecordError;
use super::export::export_log;
use super::remote::RemoteTable;
use super::turn_log::TurnLogRecord;

/// Outcome of one append. The local write and the remote mirror are independent.
#[derive(Debug)]
pub struct AppendReport {
    pub local: Result<(), RecordError>,
    /// `None` when no remote table is configured.
    pub remote: Option<Result<(), RecordError>>,
}

impl AppendReport {
    pub fn errors(&self) -> impl Iterator<Item = &RecordError> {
        self.local
            .as_ref()
            .err()
            .into_iter()
            .chain(self.remote.as_ref().and_then(|r| r.as_ref().err()))
    }
}

pub struct LogRecorder {
    path: PathBuf,
    memory: Mutex<Vec<TurnLogRecord>>,
    remote: Option<RemoteTable>,
}

impl LogRecorder {
    pub fn new(path: impl Into<PathBuf>, remote: Option<RemoteTable>) -> Self {
        Self {
            path: path.into(),
            memory: Mutex::new(Vec::new()),
            remote,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of records appended by this process, in order.
    pub fn records(&self) -> Vec<TurnLogRecord> {
        self.memory
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Append a record: memory, then the JSONL file, then the remote mirror.
    pub async fn append(&self, record: TurnLogRecord) -> AppendReport {
        self.memory
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());

        let local = self.append_local(&record).await;
        match local {
            Ok(()) => tracing::info!(
                event = LabEvent::RecordAppended.as_str(),
                path = %self.path.display(),
                user_name = %record.user_name,
                session = record.session.number(),
                "turn record appended"
            ),
            Err(ref error) => tracing::error!(
                event = LabEvent::RecordLocalWriteFailed.as_str(),
                path = %self.path.display(),
                error = %error,
                "turn record local write failed"
            ),
        }

        let remote = match self.remote {
            Some(ref table) => {
                let result = table.insert(&record).await;
                if let Err(ref error) = result {
                    tracing::warn!(
                        event = LabEvent::RecordRemoteMirrorFailed.as_str(),
                        endpoint = table.endpoint(),
                        error = %error,
                        "turn record remote mirror failed"
                    );
                }
                Some(result)
            }
            None => None,
        };
        AppendReport { local, remote }
    }

    async fn append_local(&self, record: &TurnLogRecord) -> Result<(), RecordError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RecordError::io(parent, e))?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| RecordError::io(&self.path, e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| RecordError::io(&self.path, e))?;
        file.flush().await.map_err(|e| RecordError::io(&self.path, e))
    }

    /// Export the durable log to CSV on the blocking pool; see [`export_log`].
    pub async fn export(&self, target: &Path) -> Result<Option<usize>, RecordError> {
        let source = self.path.clone();
        let target = target.to_path_buf();
        tokio::task::spawn_blocking(move || export_log(&source, &target))
            .await
            .map_err(|error| RecordError::Task(error.to_string()))?
    }
}
