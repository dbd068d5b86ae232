//! Core ReAct loop implementation.
//!
//! One `run` call drives the model through rounds of
//! reason -> act -> observe until it emits a final `<response>` tag or the
//! round budget runs out. Tool failures are fed back as observations; only
//! model-call failures abort the query.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::llm::{ChatHistory, ChatMessage, ModelClient, ModelError, Role};
use crate::tools::ToolRegistry;

use super::extraction::{extract_all_tag_content, extract_tag_content};
use super::guard;
use super::invoker::{self, ToolCall, ToolResult};
use super::prompt::build_system_prompt;

/// A ReAct agent: one model, one tool registry, one task prompt.
///
/// The agent itself is stateless across queries; every `run` call builds
/// its own history, so one instance can serve concurrent queries.
pub struct ReactAgent {
    model: Arc<dyn ModelClient>,
    tools: Arc<ToolRegistry>,
    system_prompt: String,
}

impl ReactAgent {
    pub fn new(
        model: Arc<dyn ModelClient>,
        tools: Arc<ToolRegistry>,
        task_prompt: impl AsRef<str>,
    ) -> Self {
        let system_prompt = build_system_prompt(task_prompt.as_ref(), &tools);
        Self {
            model,
            tools,
            system_prompt,
        }
    }

    /// Run a query through the loop and return the final answer text.
    ///
    /// Returns the content of the model's `<response>` tag when one
    /// appears; unstructured turns and round-budget exhaustion degrade to
    /// returning the last sanitized text rather than erroring.
    ///
    /// # Errors
    ///
    /// Only a failure of the backing model call is fatal.
    pub async fn run(&self, query: &str, max_rounds: usize) -> Result<String, ModelError> {
        let mut history = ChatHistory::new();
        history.push(ChatMessage::system(self.system_prompt.clone()));
        history.push(ChatMessage::user(query));

        let mut last_text = String::new();

        for round in 0..max_rounds {
            let raw = self.model.call(history.messages()).await?;
            let text = guard::sanitize(&raw);
            tracing::debug!(round, chars = text.len(), "model turn");

            let thought = extract_tag_content(&text, "thought");
            if thought.found {
                tracing::debug!(round, thought = %thought.content.trim(), "agent thought");
            }

            // A well-formed response terminates the loop.
            let response = extract_tag_content(&text, "response");
            if response.found {
                history.push(ChatMessage::assistant(text.clone()));
                return Ok(response.content.trim().to_string());
            }

            let call_bodies = extract_all_tag_content(&text, "tool_call");
            if call_bodies.is_empty() {
                // Neither tag present: the turn is unstructured. Treat it as
                // a terminal best-effort answer instead of stalling forever.
                tracing::warn!(round, "no response or tool_call tag; returning raw text");
                return Ok(text.trim().to_string());
            }

            let results = self.dispatch_calls(&call_bodies).await;
            let observation = serialize_observation(&results);

            history.push(ChatMessage::assistant(text.clone()));
            history.push(ChatMessage::tagged(Role::User, "observation", &observation));
            last_text = text;
        }

        tracing::warn!(max_rounds, "round budget exhausted; returning last turn");
        Ok(last_text.trim().to_string())
    }

    /// Parse and execute every tool call of one round.
    ///
    /// A body whose JSON does not parse yields an error observation for
    /// that call only; the rest of the batch still runs.
    async fn dispatch_calls(&self, call_bodies: &[String]) -> Vec<ToolResult> {
        let mut calls = Vec::new();
        let mut failures = Vec::new();

        for (index, body) in call_bodies.iter().enumerate() {
            match ToolCall::parse_many(body, index as i64) {
                Ok(parsed) => calls.extend(parsed),
                Err(e) => failures.push(ToolResult {
                    id: invoker::CallId::Int(index as i64),
                    output: format!("Error parsing tool call: {}", e),
                }),
            }
        }

        let mut results = invoker::invoke_batch(&calls, &self.tools).await;
        results.extend(failures);
        results
    }
}

/// Serialize a result batch into the observation body: a JSON object
/// keyed by call id.
fn serialize_observation(results: &[ToolResult]) -> String {
    let mut map = Map::new();
    for result in results {
        map.insert(result.id.to_string(), Value::String(result.output.clone()));
    }
    Value::Object(map).to_string()
}
