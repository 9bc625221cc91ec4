//! Append-only side log of model reasoning, one `REASONING:` line per completion.

use std::io::Write;
use std::path::PathBuf;

use crate::observability::LabEvent;

#[derive(Debug, Clone)]
pub struct ReasoningLog {
    path: Option<PathBuf>,
}

impl ReasoningLog {
    /// `None` disables the side log.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Best-effort append; failures are logged and swallowed. Multi-line
    /// reasoning is flattened into one line joined with ` / `.
    pub fn record(&self, reasoning: &str) {
        let Some(ref path) = self.path else {
            return;
        };
        let line = flatten(reasoning);
        let result = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| writeln!(file, "REASONING: {line}"));
        if let Err(error) = result {
            tracing::warn!(
                event = LabEvent::ReasoningLogWriteFailed.as_str(),
                path = %path.display(),
                error = %error,
                "failed to append reasoning log"
            );
        }
    }
}

fn flatten(reasoning: &str) -> String {
    reasoning
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" / ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_line_reasoning_stays_on_one_line() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let path = tmp.path().join("reasoning.txt");
        let log = ReasoningLog::new(Some(path.clone()));

        log.record("first point\n\n  second point  \nthird");
        log.record("single");

        let raw = std::fs::read_to_string(&path).expect("read");
        assert_eq!(
            raw,
            "REASONING: first point / second point / third\nREASONING: single\n"
        );
    }

    #[test]
    fn disabled_log_writes_nothing() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        ReasoningLog::new(None).record("ignored");
        assert_eq!(std::fs::read_dir(tmp.path()).expect("read dir").count(), 0);
    }
}
