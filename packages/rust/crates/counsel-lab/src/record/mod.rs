//! Turn log: record shape, durable JSONL store with remote mirror, CSV export.

mod error;
mod export;
mod reasoning;
mod remote;
mod store;
mod turn_log;

pub use error::RecordError;
pub use export::export_log;
pub use reasoning::ReasoningLog;
pub use remote::RemoteTable;
pub use store::{AppendReport, LogRecorder};
pub use turn_log::TurnLogRecord;
