//! Remote table mirror: PostgREST-style `POST <url>/rest/v1/<table>`.

use std::time::Duration;

use crate::config::RemoteConfig;

use super::error::RecordError;
use super::turn_log::TurnLogRecord;

pub struct RemoteTable {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl RemoteTable {
    pub fn from_config(config: &RemoteConfig) -> Self {
        let endpoint = format!(
            "{}/rest/v1/{}",
            config.url.trim_end_matches('/'),
            config.table.trim_matches('/')
        );
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key: config.api_key.clone(),
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Insert one row shaped exactly like the JSONL record.
    pub async fn insert(&self, record: &TurnLogRecord) -> Result<(), RecordError> {
        let mut req = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .header("Prefer", "return=minimal")
            .json(record);
        if let Some(ref key) = self.api_key {
            req = req.header("apikey", key).bearer_auth(key);
        }
        let res = req
            .send()
            .await
            .map_err(|error| RecordError::Remote(error.to_string()))?;
        let status = res.status();
        if status.is_success() {
            return Ok(());
        }
        let body = res.text().await.unwrap_or_default();
        Err(RecordError::Remote(format!("status {status}: {body}")))
    }
}
