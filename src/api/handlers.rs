// src/api/handlers.rs

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::Json;

use crate::api::{types::*, AppState};
use crate::report::{self, ReportFormat};
use crate::sentiment::Turn;
use crate::storage::SessionSummary;

const INDEX_HTML: &str = include_str!("index.html");

/// GET / — Chat UI.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /health — Liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// GET /sessions — All sessions, most recent first.
pub async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<Vec<SessionSummary>>, ApiError> {
    let sessions = state.store.list_sessions().await.map_err(internal_error)?;
    Ok(Json(sessions))
}

/// POST /new_chat — Create a session titled after its first message.
pub async fn new_chat(
    State(state): State<AppState>,
    Json(body): Json<NewChatRequest>,
) -> Result<Json<NewChatResponse>, ApiError> {
    let record = state
        .store
        .create_session(body.message)
        .await
        .map_err(internal_error)?;
    tracing::info!(session_id = %record.id, "Created session");

    Ok(Json(NewChatResponse {
        session_id: record.id,
        title: record.title,
    }))
}

/// GET /load_chat/{id} — Full history of one session.
pub async fn load_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LoadChatResponse>, ApiError> {
    match state.store.load_history(&id).await.map_err(internal_error)? {
        Some(history) => Ok(Json(LoadChatResponse {
            session_id: id,
            history,
        })),
        None => Err(session_not_found(&id)),
    }
}

/// POST /rename_chat — Change a session's title.
pub async fn rename_chat(
    State(state): State<AppState>,
    Json(body): Json<RenameRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let title = body.title.trim();
    if title.is_empty() {
        return Err(bad_request("Title cannot be empty"));
    }

    let renamed = state
        .store
        .rename_session(&body.session_id, title.to_string())
        .await
        .map_err(internal_error)?;
    if !renamed {
        return Err(session_not_found(&body.session_id));
    }

    Ok(Json(StatusResponse {
        status: "success".into(),
    }))
}

/// POST /chat — Analyze one message, reply, and persist the exchange.
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequestBody>,
) -> Result<Json<ChatReply>, ApiError> {
    let message = body.message.trim();
    if message.is_empty() {
        return Err(bad_request("Message cannot be empty"));
    }

    let session_id = match body.session_id.filter(|id| !id.trim().is_empty()) {
        Some(id) => id,
        None => {
            state
                .store
                .create_session(message.to_string())
                .await
                .map_err(internal_error)?
                .id
        }
    };

    let session = state
        .conversations
        .session(&session_id, &state.store)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| session_not_found(&session_id))?;
    // Held until the turn is persisted and recorded.
    let mut conversation = session.lock().await;

    let outcome = state
        .processor
        .process_turn(message, conversation.turns())
        .await;
    if outcome.is_fallback() {
        tracing::warn!(session_id = %session_id, "Replying with fallback payload");
    }
    let analysis = outcome.into_analysis();

    let appended = state
        .store
        .append_exchange(
            &session_id,
            message.to_string(),
            analysis.sentiment(),
            analysis.reply.clone(),
        )
        .await
        .map_err(internal_error)?;
    if !appended {
        return Err(session_not_found(&session_id));
    }
    conversation.push(Turn::new(message, analysis.clone()));
    drop(conversation);

    Ok(Json(ChatReply {
        session_id,
        reply: analysis.reply,
        sentiment_label: analysis.label,
        sentiment_score: analysis.score,
        emotion: analysis.emotion,
    }))
}

/// GET /report?session_id= — Aggregate sentiment for one session.
pub async fn report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ReportResponse>, ApiError> {
    let session_id = required_session_id(query)?;
    let report = build_report(&state, &session_id).await?;

    Ok(Json(ReportResponse {
        session_id: report.session_id,
        title: report.title,
        overall_sentiment: report.overall_sentiment,
        trend: report.trend,
        executive_summary: report.executive_summary,
        dominant_emotion: report.dominant_emotion,
        turn_count: report.turn_count,
        emotion_breakdown: report.emotion_breakdown,
    }))
}

/// GET /download_report/{format}?session_id= — Report as an attachment.
pub async fn download_report(
    State(state): State<AppState>,
    Path(format): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let format: ReportFormat = format.parse().map_err(bad_request)?;
    let session_id = required_session_id(query)?;
    let report = build_report(&state, &session_id).await?;

    let body = report.render(format).map_err(internal_error)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        report::attachment_filename(&report.title, format)
    );

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

fn required_session_id(query: ReportQuery) -> Result<String, ApiError> {
    query
        .session_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| bad_request("Missing session_id"))
}

async fn build_report(
    state: &AppState,
    session_id: &str,
) -> Result<report::SessionReport, ApiError> {
    report::generate_report(
        &state.store,
        &state.conversations,
        Some(state.processor.as_ref()),
        session_id,
    )
    .await
    .map_err(internal_error)?
    .ok_or_else(|| session_not_found(session_id))
}
