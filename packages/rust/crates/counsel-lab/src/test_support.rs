//! Test-only completion doubles shared by integration tests.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::llm::{CompletionRequest, CompletionService};

/// Replays queued completion results in order and records every request.
#[derive(Default)]
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    delay: Option<Duration>,
}

impl ScriptedCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long before answering each request.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a raw completion text.
    pub fn reply(self, raw: impl Into<String>) -> Self {
        self.lock_replies().push_back(Ok(raw.into()));
        self
    }

    /// Queue a service failure.
    pub fn fail(self, error: impl Into<String>) -> Self {
        self.lock_replies().push_back(Err(error.into()));
        self
    }

    /// Queue a JSON payload with three answers.
    pub fn three_options(self, options: [&str; 3], reasoning: &str) -> Self {
        let payload = serde_json::json!({ "answers": options, "reasoning": reasoning });
        self.reply(payload.to_string())
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn lock_replies(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<String, String>>> {
        self.replies.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.lock_replies().pop_front() {
            Some(Ok(raw)) => Ok(raw),
            Some(Err(error)) => Err(anyhow::anyhow!(error)),
            None => Err(anyhow::anyhow!("no scripted completion left")),
        }
    }
}
