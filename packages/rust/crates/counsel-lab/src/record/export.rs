//! CSV export of the durable JSONL turn log, regenerated wholesale.

use std::path::Path;

use serde::Serialize;

use crate::observability::LabEvent;

use super::error::RecordError;
use super::turn_log::TurnLogRecord;

/// Flat CSV row; list-valued fields are joined into one text block.
#[derive(Debug, Serialize)]
struct ExportRow {
    user_name: String,
    session: u8,
    user: String,
    assistant: String,
    assistant_selected: String,
    good_idx: Option<usize>,
    bad_idx: Option<usize>,
    good_reason: String,
    bad_reason: String,
    reasoning: String,
}

impl From<TurnLogRecord> for ExportRow {
    fn from(record: TurnLogRecord) -> Self {
        Self {
            user_name: record.user_name,
            session: record.session.number(),
            user: record.user,
            assistant: record.assistant.joined(),
            assistant_selected: record.assistant_selected,
            good_idx: record.good_idx,
            bad_idx: record.bad_idx,
            good_reason: record.good_reason,
            bad_reason: record.bad_reason,
            reasoning: record.reasoning,
        }
    }
}

/// Write every record of `source` to `target` as CSV.
///
/// Returns `Ok(None)` without touching `target` when the source is missing,
/// empty, or holds a line that does not decode as a turn record.
pub fn export_log(source: &Path, target: &Path) -> Result<Option<usize>, RecordError> {
    let raw = match std::fs::read_to_string(source) {
        Ok(raw) => raw,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(error) => return Err(RecordError::io(source, error)),
    };

    let mut records = Vec::new();
    for (line_no, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<TurnLogRecord>(line) {
            Ok(record) => records.push(record),
            Err(error) => {
                tracing::warn!(
                    path = %source.display(),
                    line = line_no + 1,
                    error = %error,
                    "turn log line does not decode; skipping export"
                );
                return Ok(None);
            }
        }
    }
    if records.is_empty() {
        return Ok(None);
    }

    if let Some(parent) = target.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| RecordError::io(parent, e))?;
    }
    let export_err = |source: csv::Error| RecordError::Export {
        path: target.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(target).map_err(export_err)?;
    let count = records.len();
    for record in records {
        writer.serialize(ExportRow::from(record)).map_err(export_err)?;
    }
    writer
        .flush()
        .map_err(|e| RecordError::io(target, e))?;

    tracing::info!(
        event = LabEvent::RecordExported.as_str(),
        source = %source.display(),
        target = %target.display(),
        rows = count,
        "turn log exported"
    );
    Ok(Some(count))
}
