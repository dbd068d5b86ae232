//! Google Gemini client (`generateContent` API).
//!
//! Gemini has no native system/assistant message roles in the simple text
//! path, so the history is flattened into a single role-prefixed prompt.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{ChatMessage, ModelClient, ModelError, Role};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, api_key: String, model: String) -> Self {
        Self {
            http,
            api_key,
            model,
        }
    }

    /// Flatten the chat history into one prompt with role prefixes.
    fn flatten_history(history: &[ChatMessage]) -> String {
        history
            .iter()
            .map(|msg| {
                let prefix = match msg.role {
                    Role::System => "System",
                    Role::User => "User",
                    Role::Assistant => "Assistant",
                };
                format!("{}: {}", prefix, msg.content)
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn call(&self, history: &[ChatMessage]) -> Result<String, ModelError> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_API_BASE,
            self.model,
            urlencoding::encode(&self.api_key)
        );

        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": Self::flatten_history(history) }]
            }]
        });

        let response = self.http.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response.json().await?;
        let parts = payload["candidates"][0]["content"]["parts"]
            .as_array()
            .ok_or_else(|| ModelError::Shape("missing candidates[0].content.parts".to_string()))?;

        let text: String = parts
            .iter()
            .filter_map(|p| p["text"].as_str())
            .collect::<Vec<_>>()
            .join("");

        Ok(text)
    }
}
