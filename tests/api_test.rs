// tests/api_test.rs — Integration test: HTTP routes over an in-memory store

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use sentichat::api::{build_router, AppState};
use sentichat::infra::config::Config;
use sentichat::infra::errors::SentiChatError;
use sentichat::provider::{ChatRequest, ChatResponse, ModelProvider, TokenUsage};
use sentichat::sentiment::processor::TurnProcessor;
use sentichat::sentiment::FALLBACK_REPLY;
use sentichat::storage::{spawn_store_server, Database};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Turn requests carry a system instruction; summary requests do not.
struct MockGemini {
    offline: AtomicBool,
}

#[async_trait]
impl ModelProvider for MockGemini {
    fn id(&self) -> &str {
        "mock"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, SentiChatError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(SentiChatError::Provider {
                provider: "mock".into(),
                message: "HTTP 503".into(),
                retriable: true,
            });
        }

        let content = if request.system.is_some() {
            json!({ "sentiment_score": 0.4, "emotion": "Joy", "reply": "Glad to hear it!" })
        } else {
            json!({ "summary": "The user was upbeat.", "dominant_emotion": "Joy" })
        };
        Ok(ChatResponse {
            content: content.to_string(),
            usage: TokenUsage::default(),
        })
    }
}

fn app_with(offline: bool) -> Router {
    let db = Database::in_memory().unwrap();
    let (store, _join) = spawn_store_server(db.store);

    let mut config = Config::default();
    config.retry.delay_ms = 0;
    let provider = Arc::new(MockGemini {
        offline: AtomicBool::new(offline),
    });

    build_router(AppState::new(store, TurnProcessor::new(provider, &config)))
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, body) = send(app, req).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, body) = send(app, req).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_chat_creates_session_and_persists() {
    let app = app_with(false);

    let (status, reply) = post_json(&app, "/chat", json!({ "message": "I GOT THE JOB" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["reply"], "Glad to hear it!");
    assert_eq!(reply["sentiment_label"], "Positive");
    assert_eq!(reply["emotion"], "Joy");
    let score = reply["sentiment_score"].as_f64().unwrap();
    assert!((score - 0.6).abs() < 1e-9);

    let session_id = reply["session_id"].as_str().unwrap().to_string();
    let (status, loaded) = get_json(&app, &format!("/load_chat/{session_id}")).await;
    assert_eq!(status, StatusCode::OK);
    let history = loaded["history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["role"], "user");
    assert_eq!(history[0]["text"], "I GOT THE JOB");
    assert_eq!(history[1]["role"], "model");

    let (_, sessions) = get_json(&app, "/sessions").await;
    assert_eq!(sessions[0]["id"], session_id.as_str());
    assert_eq!(sessions[0]["title"], "I GOT THE JOB...");
}

#[tokio::test]
async fn test_chat_rejects_empty_message() {
    let app = app_with(false);
    let (status, body) = post_json(&app, "/chat", json!({ "message": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_chat_unknown_session_is_404() {
    let app = app_with(false);
    let (status, _) = post_json(
        &app,
        "/chat",
        json!({ "message": "hi", "session_id": "no-such-session" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_chat_offline_model_returns_fallback() {
    let app = app_with(true);
    let (status, reply) = post_json(&app, "/chat", json!({ "message": "hello?" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["reply"], FALLBACK_REPLY);
    assert_eq!(reply["sentiment_label"], "Neutral");
    assert_eq!(reply["sentiment_score"], 0.0);
    assert_eq!(reply["emotion"], "Neutral");

    let session_id = reply["session_id"].as_str().unwrap();
    let (_, loaded) = get_json(&app, &format!("/load_chat/{session_id}")).await;
    assert_eq!(loaded["history"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_new_chat_then_rename() {
    let app = app_with(false);

    let (status, created) = post_json(&app, "/new_chat", json!({ "message": "Hello" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["title"], "Hello...");
    let id = created["session_id"].as_str().unwrap().to_string();

    let (_, loaded) = get_json(&app, &format!("/load_chat/{id}")).await;
    assert_eq!(loaded["history"], json!([]));

    let (status, _) = post_json(
        &app,
        "/rename_chat",
        json!({ "session_id": id, "title": "Work stress" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, sessions) = get_json(&app, "/sessions").await;
    assert_eq!(sessions[0]["title"], "Work stress");
}

#[tokio::test]
async fn test_rename_validation() {
    let app = app_with(false);

    let (status, _) = post_json(
        &app,
        "/rename_chat",
        json!({ "session_id": "missing", "title": "x" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, created) = post_json(&app, "/new_chat", json!({ "message": "Hello" })).await;
    let (status, _) = post_json(
        &app,
        "/rename_chat",
        json!({ "session_id": created["session_id"], "title": "  " }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_load_unknown_chat_is_404() {
    let app = app_with(false);
    let (status, _) = get_json(&app, "/load_chat/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_report_for_session() {
    let app = app_with(false);
    let (_, first) = post_json(&app, "/chat", json!({ "message": "good morning" })).await;
    let id = first["session_id"].as_str().unwrap().to_string();
    post_json(&app, "/chat", json!({ "message": "still good", "session_id": id })).await;

    let (status, report) = get_json(&app, &format!("/report?session_id={id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["overall_sentiment"], "Positive (Avg Score: 0.40)");
    assert_eq!(report["trend"], "Stable (Consistent mood)");
    assert_eq!(report["executive_summary"], "The user was upbeat.");
    assert_eq!(report["dominant_emotion"], "Joy");
    assert_eq!(report["turn_count"], 2);
    assert_eq!(report["emotion_breakdown"]["Joy"], 2);
}

#[tokio::test]
async fn test_report_requires_known_session() {
    let app = app_with(false);
    let (status, _) = get_json(&app, "/report").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(&app, "/report?session_id=missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_report_txt() {
    let app = app_with(false);
    let (_, created) =
        post_json(&app, "/new_chat", json!({ "message": "Rough week: part 2" })).await;
    let id = created["session_id"].as_str().unwrap().to_string();

    let req = Request::builder()
        .uri(format!("/download_report/txt?session_id={id}"))
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let disposition = resp.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(
        disposition,
        "attachment; filename=\"sentiment_report_Rough_week_part_2.txt\""
    );

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("Overall Sentiment: No conversation recorded."));
}

#[tokio::test]
async fn test_download_report_json_and_bad_format() {
    let app = app_with(false);
    let (_, reply) = post_json(&app, "/chat", json!({ "message": "hello" })).await;
    let id = reply["session_id"].as_str().unwrap().to_string();

    let (status, report) = get_json(&app, &format!("/download_report/json?session_id={id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["session_id"], id.as_str());
    assert_eq!(report["transcript"][0]["message"], "hello");

    let (status, _) = get_json(&app, &format!("/download_report/pdf?session_id={id}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Records how much context each turn request carried.
struct SlowRecordingGemini {
    context_sizes: Mutex<Vec<usize>>,
}

#[async_trait]
impl ModelProvider for SlowRecordingGemini {
    fn id(&self) -> &str {
        "slow"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, SentiChatError> {
        if request.system.is_some() {
            self.context_sizes
                .lock()
                .unwrap()
                .push(request.messages.len());
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        let last = request
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        Ok(ChatResponse {
            content: json!({ "sentiment_score": 0.0, "reply": format!("re: {last}") }).to_string(),
            usage: TokenUsage::default(),
        })
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_turns_on_one_session_are_serialized() {
    let db = Database::in_memory().unwrap();
    let (store, _join) = spawn_store_server(db.store);
    let mut config = Config::default();
    config.retry.delay_ms = 0;
    let provider = Arc::new(SlowRecordingGemini {
        context_sizes: Mutex::new(Vec::new()),
    });
    let app = build_router(AppState::new(
        store,
        TurnProcessor::new(provider.clone(), &config),
    ));

    let (_, created) = post_json(&app, "/new_chat", json!({ "message": "start" })).await;
    let id = created["session_id"].as_str().unwrap().to_string();

    let (a, b) = tokio::join!(
        post_json(&app, "/chat", json!({ "message": "first", "session_id": id })),
        post_json(&app, "/chat", json!({ "message": "second", "session_id": id })),
    );
    assert_eq!(a.0, StatusCode::OK);
    assert_eq!(b.0, StatusCode::OK);

    // The later turn saw the earlier one as context.
    let mut sizes = provider.context_sizes.lock().unwrap().clone();
    sizes.sort();
    assert_eq!(sizes, vec![1, 3]);

    let (_, loaded) = get_json(&app, &format!("/load_chat/{id}")).await;
    let stored: Vec<String> = loaded["history"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|e| e["role"] == "user")
        .map(|e| e["text"].as_str().unwrap().to_string())
        .collect();

    let (_, report) = get_json(&app, &format!("/download_report/json?session_id={id}")).await;
    let cached: Vec<String> = report["transcript"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["message"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(stored, cached);
}

#[tokio::test]
async fn test_chat_fails_when_store_lost_the_session() {
    let db = Database::in_memory().unwrap();
    let (store, _join) = spawn_store_server(db.store);
    let mut config = Config::default();
    config.retry.delay_ms = 0;
    let provider = Arc::new(MockGemini {
        offline: AtomicBool::new(false),
    });
    let state = AppState::new(store, TurnProcessor::new(provider, &config));
    let app = build_router(state.clone());

    let (_, reply) = post_json(&app, "/chat", json!({ "message": "hello" })).await;
    let id = reply["session_id"].as_str().unwrap().to_string();

    // Same cached conversations, but a store that has never seen the session.
    let empty = Database::in_memory().unwrap();
    let (other_store, _other_join) = spawn_store_server(empty.store);
    let detached = build_router(AppState {
        store: other_store,
        ..state
    });

    let (status, body) = post_json(
        &detached,
        "/chat",
        json!({ "message": "again", "session_id": id }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}
