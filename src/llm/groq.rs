//! Groq chat-completions client (OpenAI-compatible API).

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{ChatMessage, ModelClient, ModelError};
use crate::agent::guard;

const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Client for the Groq chat-completions endpoint.
pub struct GroqClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GroqClient {
    pub fn new(http: reqwest::Client, api_key: String, model: String) -> Self {
        Self {
            http,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl ModelClient for GroqClient {
    async fn call(&self, history: &[ChatMessage]) -> Result<String, ModelError> {
        // The API accepts a limited number of stop sequences, so only the
        // strongest markers go upstream; the simulation guard re-checks the
        // full set on the returned text anyway.
        let body = json!({
            "model": self.model,
            "messages": history,
            "stop": guard::API_STOP_SEQUENCES,
        });

        let response = self
            .http
            .post(GROQ_API_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response.json().await?;
        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                ModelError::Shape("missing choices[0].message.content".to_string())
            })?;

        Ok(content.to_string())
    }
}
