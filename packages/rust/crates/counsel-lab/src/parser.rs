//! Completion parser: pulls answer candidates and reasoning out of raw model text.
//!
//! The model is asked for a JSON object `{"answers": ..., "reasoning": ...}`,
//! optionally wrapped in a code fence. When that shape is not there, the raw
//! text is split into lines and list markers are stripped.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Either one text or an ordered list of texts.
///
/// Used for the `answers` / `reasoning` fields of a completion and for the
/// `assistant` field of a persisted turn record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextOrList {
    Text(String),
    List(Vec<String>),
}

impl TextOrList {
    /// Shape-check a JSON value. Strings and arrays are accepted; array
    /// elements of any type are coerced to text.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(Self::Text(text.clone())),
            Value::Array(items) => Some(Self::List(items.iter().map(value_to_text).collect())),
            _ => None,
        }
    }

    /// Flatten to one text block; list items are joined by newlines.
    pub fn joined(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::List(items) => items.join("\n"),
        }
    }
}

/// Result of parsing one completion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedCompletion {
    /// Non-empty, trimmed answer candidates.
    pub answers: Vec<String>,
    /// Reasoning text; `Some` whenever the payload decoded as a JSON object,
    /// even if `answers` was unusable.
    pub reasoning: Option<String>,
}

/// Parse raw completion text into answers and reasoning.
pub fn parse_completion(raw: &str) -> ParsedCompletion {
    let mut reasoning = None;
    if let Ok(Value::Object(payload)) = serde_json::from_str::<Value>(strip_code_fence(raw)) {
        reasoning = Some(reasoning_text(payload.get("reasoning")));
        match payload.get("answers").and_then(TextOrList::from_value) {
            Some(TextOrList::Text(one)) => {
                let one = one.trim();
                let answers = if one.is_empty() {
                    Vec::new()
                } else {
                    vec![one.to_string()]
                };
                return ParsedCompletion { answers, reasoning };
            }
            Some(TextOrList::List(items)) => {
                let answers: Vec<String> = items
                    .iter()
                    .map(|item| item.trim())
                    .filter(|item| !item.is_empty())
                    .map(ToString::to_string)
                    .collect();
                if !answers.is_empty() {
                    return ParsedCompletion { answers, reasoning };
                }
            }
            None => {}
        }
    }
    ParsedCompletion {
        answers: split_fallback_lines(raw),
        reasoning,
    }
}

/// Strip a surrounding backtick fence and a leading `json` language tag.
fn strip_code_fence(raw: &str) -> &str {
    let cleaned = raw.trim();
    if !cleaned.starts_with("```") {
        return cleaned;
    }
    let unfenced = cleaned.trim_matches('`');
    match unfenced.strip_prefix("json") {
        Some(rest) => rest.trim(),
        None => unfenced,
    }
}

fn split_fallback_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(|line| {
            line.trim_matches(|c: char| matches!(c, '-' | '*' | ' ' | '.') || c.is_ascii_digit())
                .trim()
        })
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn reasoning_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(value) => TextOrList::from_value(value)
            .map_or_else(|| value_to_text(value), |shaped| shaped.joined()),
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
