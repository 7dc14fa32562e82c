// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::infra::errors::SentiChatError;
use crate::infra::paths;

/// Environment variables checked for the Gemini key, in order.
const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub name: String,
    /// Used only when no key is found in the environment.
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    /// Prior exchanges sent along with each new message.
    pub context_turns: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "gemini-2.5-flash".into(),
            api_key: None,
            base_url: None,
            temperature: None,
            context_turns: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 1000,
        }
    }
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub db_path: Option<String>,
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), SentiChatError> {
        if self.retry.max_attempts == 0 {
            return Err(SentiChatError::Config(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        if self.model.name.trim().is_empty() {
            return Err(SentiChatError::Config("model.name cannot be empty".into()));
        }
        Ok(())
    }

    /// Resolve the API key: environment first, then `[model].api_key`.
    pub fn resolve_api_key(&self) -> Result<String, SentiChatError> {
        self.resolve_api_key_with(|var| std::env::var(var).ok())
    }

    pub(crate) fn resolve_api_key_with<F>(&self, lookup: F) -> Result<String, SentiChatError>
    where
        F: Fn(&str) -> Option<String>,
    {
        API_KEY_ENV_VARS
            .iter()
            .filter_map(|&var| lookup(var))
            .chain(self.model.api_key.clone())
            .find(|key| !key.trim().is_empty())
            .ok_or(SentiChatError::NoApiKey)
    }

    /// Database location: `[storage].db_path` or the default data dir.
    pub fn db_path(&self) -> anyhow::Result<PathBuf> {
        match self.storage.db_path {
            Some(ref p) => Ok(PathBuf::from(p)),
            None => paths::db_path(),
        }
    }
}
