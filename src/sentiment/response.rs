// src/sentiment/response.rs — Validate untrusted model output field by field
//
// The model is asked for JSON only, but its text is treated as untyped
// input: fences are stripped, the outermost object is salvaged, and each
// field is checked with its own defaulting rule.

use serde_json::{Map, Value};

use super::Emotion;
use crate::infra::errors::SentiChatError;

/// The fields taken from a turn response, before local adjustment.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelVerdict {
    pub raw_score: f64,
    pub emotion: Emotion,
    pub reply: String,
}

/// Fields taken from an executive-summary response.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryVerdict {
    pub summary: String,
    pub dominant_emotion: Option<String>,
}

/// Parse and validate the JSON payload of a turn.
///
/// `sentiment_score` and `reply` are required; `emotion` falls back to
/// Neutral when missing or unrecognized.
pub fn parse_turn_response(text: &str) -> Result<ModelVerdict, SentiChatError> {
    let obj = parse_json_object(text)?;

    let raw_score = obj
        .get("sentiment_score")
        .and_then(number_value)
        .ok_or(SentiChatError::MissingField {
            field: "sentiment_score",
        })?;

    let reply = obj
        .get("reply")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or(SentiChatError::MissingField { field: "reply" })?
        .to_string();

    let emotion = match obj.get("emotion").and_then(Value::as_str) {
        Some(name) => Emotion::parse(name).unwrap_or_else(|| {
            tracing::debug!("Unrecognized emotion '{}', using Neutral", name);
            Emotion::Neutral
        }),
        None => Emotion::Neutral,
    };

    Ok(ModelVerdict {
        raw_score,
        emotion,
        reply,
    })
}

/// Parse the JSON payload of an executive summary.
pub fn parse_summary_response(text: &str) -> Result<SummaryVerdict, SentiChatError> {
    let obj = parse_json_object(text)?;

    let summary = obj
        .get("summary")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(SentiChatError::MissingField { field: "summary" })?
        .to_string();

    let dominant_emotion = obj
        .get("dominant_emotion")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(SummaryVerdict {
        summary,
        dominant_emotion,
    })
}

/// Parse `text` as a JSON object, repairing common wrapping on the way.
pub fn parse_json_object(text: &str) -> Result<Map<String, Value>, SentiChatError> {
    let stripped = strip_code_fences(text);

    let value = serde_json::from_str::<Value>(stripped).or_else(|first_err| {
        outermost_object(text)
            .and_then(|slice| serde_json::from_str::<Value>(slice).ok())
            .ok_or_else(|| SentiChatError::MalformedResponse(first_err.to_string()))
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(SentiChatError::MalformedResponse(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

/// Remove a surrounding Markdown code fence (```json ... ```), if present.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json"), which may share the line with the body.
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// The slice from the first `{` to the last `}`.
fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Accept JSON numbers and numeric strings; reject non-finite values.
fn number_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
