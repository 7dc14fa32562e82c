// src/api/types.rs

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::sentiment::{Emotion, SentimentLabel};
use crate::storage::HistoryEntry;

/// Body for `POST /new_chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewChatResponse {
    pub session_id: String,
    pub title: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoadChatResponse {
    pub session_id: String,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameRequest {
    pub session_id: String,
    #[serde(default)]
    pub title: String,
}

/// Body for `POST /chat`. A missing `session_id` starts a new session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequestBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub session_id: String,
    pub reply: String,
    pub sentiment_label: SentimentLabel,
    pub sentiment_score: f64,
    pub emotion: Emotion,
}

/// Query string shared by the report routes.
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportResponse {
    pub session_id: String,
    pub title: String,
    pub overall_sentiment: String,
    pub trend: String,
    pub executive_summary: String,
    pub dominant_emotion: String,
    pub turn_count: usize,
    pub emotion_breakdown: BTreeMap<String, usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub fn bad_request(message: impl Into<String>) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, message)
}

pub fn session_not_found(id: &str) -> ApiError {
    api_error(StatusCode::NOT_FOUND, format!("Session '{id}' not found"))
}

/// Log the cause and hide it from the client.
pub fn internal_error(err: anyhow::Error) -> ApiError {
    tracing::error!("Request failed: {:#}", err);
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}
