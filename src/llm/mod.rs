//! Model-call boundary: chat message types and the provider-agnostic client.
//!
//! The agent core only ever sees `call(history) -> String`; which backend
//! produces the text is decided once, from configuration, at startup.

mod gemini;
mod groq;
pub mod history;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{Config, ConfigError, Provider};

pub use gemini::GeminiClient;
pub use groq::GroqClient;
pub use history::ChatHistory;

/// Speaker role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in the conversation fed to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Build a message whose content is wrapped in a `<tag>...</tag>` span,
    /// the structure the agent protocol uses for observations.
    pub fn tagged(role: Role, tag: &str, content: &str) -> Self {
        Self {
            role,
            content: format!("<{tag}>{content}</{tag}>"),
        }
    }
}

/// Errors from the backing model provider. Fatal for the current query.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("model returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected model response shape: {0}")]
    Shape(String),
}

/// A chat-completion backend.
///
/// Implementations return the raw assistant text for the given history. The
/// caller is responsible for sanitizing and parsing it; implementations must
/// not embed provider-specific response shapes beyond extracting the text.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn call(&self, history: &[ChatMessage]) -> Result<String, ModelError>;
}

/// Construct the model client selected by the configuration.
pub fn client_from_config(config: &Config) -> Result<Arc<dyn ModelClient>, ConfigError> {
    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.http_timeout_secs))
        .build()
        .map_err(|e| ConfigError::InvalidValue("HTTP_TIMEOUT_SECS".to_string(), e.to_string()))?;

    match config.provider {
        Provider::Gemini => {
            let key = config
                .google_api_key
                .clone()
                .ok_or_else(|| ConfigError::MissingEnvVar("GEMINI_API_KEY".to_string()))?;
            Ok(Arc::new(GeminiClient::new(http, key, config.model.clone())))
        }
        Provider::Groq => {
            let key = config
                .groq_api_key
                .clone()
                .ok_or_else(|| ConfigError::MissingEnvVar("GROQ_API_KEY".to_string()))?;
            Ok(Arc::new(GroqClient::new(http, key, config.model.clone())))
        }
    }
}
