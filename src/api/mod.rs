// src/api/mod.rs — HTTP server for the chat UI and report downloads

pub mod handlers;
pub mod types;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::infra::config::ServerConfig;
use crate::sentiment::processor::TurnProcessor;
use crate::sentiment::registry::ConversationRegistry;
use crate::storage::StoreHandle;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: StoreHandle,
    pub processor: Arc<TurnProcessor>,
    pub conversations: Arc<ConversationRegistry>,
}

impl AppState {
    pub fn new(store: StoreHandle, processor: TurnProcessor) -> Self {
        Self {
            store,
            processor: Arc::new(processor),
            conversations: Arc::new(ConversationRegistry::new()),
        }
    }
}

/// Build the axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            axum::http::HeaderValue::from_static("http://localhost:3000"),
            axum::http::HeaderValue::from_static("http://localhost:5000"),
            axum::http::HeaderValue::from_static("http://127.0.0.1:3000"),
            axum::http::HeaderValue::from_static("http://127.0.0.1:5000"),
        ])
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/sessions", get(handlers::list_sessions))
        .route("/new_chat", post(handlers::new_chat))
        .route("/load_chat/{id}", get(handlers::load_chat))
        .route("/rename_chat", post(handlers::rename_chat))
        .route("/chat", post(handlers::chat))
        .route("/report", get(handlers::report))
        .route("/download_report/{format}", get(handlers::download_report))
        .layer(cors)
        .with_state(state)
}

/// Start the server and serve until the process is stopped.
pub async fn start_server(config: &ServerConfig, state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{addr}");
    axum::serve(listener, router).await?;
    Ok(())
}
