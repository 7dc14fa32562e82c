// src/provider/resolver.rs — Build the configured provider

use std::sync::Arc;

use super::google::GoogleProvider;
use super::ModelProvider;
use crate::infra::config::Config;
use crate::infra::errors::SentiChatError;

/// Gemini provider from the resolved API key and optional endpoint override.
pub fn provider_from_config(config: &Config) -> Result<Arc<dyn ModelProvider>, SentiChatError> {
    let api_key = config.resolve_api_key()?;
    let mut provider = GoogleProvider::new(api_key);
    if let Some(ref base_url) = config.model.base_url {
        tracing::debug!("Using Gemini endpoint override: {}", base_url);
        provider = provider.with_base_url(base_url.as_str());
    }
    Ok(Arc::new(provider))
}
