// src/infra/errors.rs — Error types for SentiChat

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SentiChatError {
    // Provider errors
    #[error("Provider '{provider}' error: {message}")]
    Provider {
        provider: String,
        message: String,
        retriable: bool,
    },

    #[error("Rate limited by '{provider}', retry after {retry_after_ms}ms")]
    RateLimited {
        provider: String,
        retry_after_ms: u64,
    },

    // Response contract errors
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("Model response missing required field '{field}'")]
    MissingField { field: &'static str },

    // User errors
    #[error("No API key configured. Set GEMINI_API_KEY (or GOOGLE_API_KEY) or [model].api_key in config.toml.")]
    NoApiKey,

    #[error("Session '{id}' not found")]
    SessionNotFound { id: String },

    // Infra
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SentiChatError {
    /// Whether the remote side might succeed on a later attempt.
    ///
    /// The turn processor retries every failure regardless; this is used
    /// for log severity only.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            SentiChatError::Provider {
                retriable: true,
                ..
            } | SentiChatError::RateLimited { .. }
        )
    }
}
