//! Batch tool invocation - failure-isolated execution of parsed tool calls.
//!
//! One bad call never aborts the rest of the batch: every failure mode
//! becomes an error string inside the matching [`ToolResult`]. Calls in a
//! batch run concurrently; results come back in input order.

use std::fmt;

use futures::stream::{self, StreamExt};
use serde::Deserialize;
use serde_json::Value;

use crate::tools::{ToolParameter, ToolRegistry};

/// Concurrency bound for one batch; calls beyond this wait for a slot.
const MAX_CONCURRENT_CALLS: usize = 4;

/// Caller-supplied identifier matching a call to its result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CallId {
    Int(i64),
    Str(String),
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallId::Int(n) => write!(f, "{}", n),
            CallId::Str(s) => write!(f, "{}", s),
        }
    }
}

/// A tool invocation parsed from one model turn.
#[derive(Debug, Clone)]
pub struct ToolCall {
    pub name: String,
    pub arguments: Value,
    pub id: CallId,
}

#[derive(Deserialize)]
struct RawToolCall {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
    #[serde(default)]
    id: Option<CallId>,
}

impl ToolCall {
    /// Parse the JSON body of one `tool_call` tag.
    ///
    /// `fallback_id` is used when the model omitted the `id` field, so
    /// results stay matchable within the round.
    pub fn parse(body: &str, fallback_id: i64) -> Result<Self, serde_json::Error> {
        let raw: RawToolCall = serde_json::from_str(body.trim())?;
        Ok(Self {
            name: raw.name,
            arguments: raw.arguments.unwrap_or_else(|| Value::Object(Default::default())),
            id: raw.id.unwrap_or(CallId::Int(fallback_id)),
        })
    }

    /// Parse a tag body that may hold either a single call object or an
    /// array of call objects. Each element gets its own fallback id.
    pub fn parse_many(body: &str, first_fallback_id: i64) -> Result<Vec<Self>, serde_json::Error> {
        let trimmed = body.trim();
        if trimmed.starts_with('[') {
            let raws: Vec<RawToolCall> = serde_json::from_str(trimmed)?;
            Ok(raws
                .into_iter()
                .enumerate()
                .map(|(i, raw)| Self {
                    name: raw.name,
                    arguments: raw
                        .arguments
                        .unwrap_or_else(|| Value::Object(Default::default())),
                    id: raw.id.unwrap_or(CallId::Int(first_fallback_id + i as i64)),
                })
                .collect())
        } else {
            Self::parse(trimmed, first_fallback_id).map(|call| vec![call])
        }
    }
}

/// Outcome of one tool call; `output` is real tool output or error text.
#[derive(Debug, Clone)]
pub struct ToolResult {
    pub id: CallId,
    pub output: String,
}

/// Invoke every call in the batch against the registry.
///
/// Calls run concurrently over a bounded pool; the returned results match
/// the input order regardless of completion order (ids also allow
/// out-of-order matching).
pub async fn invoke_batch(calls: &[ToolCall], registry: &ToolRegistry) -> Vec<ToolResult> {
    let futures: Vec<_> = calls.iter().map(|call| invoke_one(call, registry)).collect();
    stream::iter(futures)
        .buffered(MAX_CONCURRENT_CALLS)
        .collect()
        .await
}

async fn invoke_one(call: &ToolCall, registry: &ToolRegistry) -> ToolResult {
    let tool = match registry.resolve(&call.name) {
        Ok(tool) => tool,
        Err(e) => {
            return ToolResult {
                id: call.id.clone(),
                output: e.to_string(),
            }
        }
    };

    // Refuse to invoke with an incomplete signature; a partial call must
    // not reach the tool at all.
    if let Some(missing) = first_missing_required(tool.parameters(), &call.arguments) {
        return ToolResult {
            id: call.id.clone(),
            output: format!(
                "Error executing tool {}: missing required parameter '{}'",
                call.name, missing
            ),
        };
    }

    tracing::info!(tool = %call.name, id = %call.id, "invoking tool");

    match tool.invoke(&call.arguments).await {
        Ok(output) => ToolResult {
            id: call.id.clone(),
            output,
        },
        Err(e) => ToolResult {
            id: call.id.clone(),
            output: format!("Error executing tool {}: {}", call.name, e),
        },
    }
}

fn first_missing_required(parameters: &[ToolParameter], args: &Value) -> Option<&'static str> {
    parameters
        .iter()
        .filter(|p| p.required)
        .find(|p| args.get(p.name).map_or(true, Value::is_null))
        .map(|p| p.name)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::tools::{test_support::EchoTool, Tool};

    /// Counts invocations so tests can assert a tool was never reached.
    struct CountingTool {
        calls: Arc<AtomicUsize>,
    }

    const COUNTING_PARAMS: [ToolParameter; 1] =
        [ToolParameter::required("query", "string", "Query to run")];

    #[async_trait]
    impl Tool for CountingTool {
        fn name(&self) -> &str {
            "counting"
        }

        fn description(&self) -> &str {
            "Counts invocations"
        }

        fn parameters(&self) -> &[ToolParameter] {
            &COUNTING_PARAMS
        }

        async fn invoke(&self, _args: &Value) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("counted".to_string())
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &str {
            "failing"
        }

        fn description(&self) -> &str {
            "Always fails"
        }

        fn parameters(&self) -> &[ToolParameter] {
            &[]
        }

        async fn invoke(&self, _args: &Value) -> anyhow::Result<String> {
            Err(anyhow::anyhow!("backend unavailable"))
        }
    }

    fn registry_with_echo() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register(Arc::new(EchoTool { tool_name: "echo" }))
            .unwrap();
        registry
    }

    #[test]
    fn parse_fills_missing_id_from_fallback() {
        let call = ToolCall::parse(r#"{"name": "echo", "arguments": {"value": "x"}}"#, 7).unwrap();
        assert_eq!(call.id, CallId::Int(7));
        assert_eq!(call.name, "echo");
    }

    #[test]
    fn parse_accepts_string_ids() {
        let call = ToolCall::parse(r#"{"name": "echo", "arguments": {}, "id": "a1"}"#, 0).unwrap();
        assert_eq!(call.id, CallId::Str("a1".to_string()));
    }

    #[test]
    fn parse_many_expands_arrays() {
        let body = r#"[{"name": "echo", "arguments": {}}, {"name": "echo", "arguments": {}, "id": 9}]"#;
        let calls = ToolCall::parse_many(body, 0).unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].id, CallId::Int(0));
        assert_eq!(calls[1].id, CallId::Int(9));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(ToolCall::parse("not json at all", 0).is_err());
    }

    #[test]
    fn batch_preserves_order_with_unknown_tool() {
        let registry = registry_with_echo();
        let calls = vec![
            ToolCall {
                name: "echo".to_string(),
                arguments: json!({"value": "real"}),
                id: CallId::Int(0),
            },
            ToolCall {
                name: "nonexistent".to_string(),
                arguments: json!({}),
                id: CallId::Int(1),
            },
        ];

        let results = tokio_test::block_on(invoke_batch(&calls, &registry));

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, CallId::Int(0));
        assert_eq!(results[0].output, "echo:real");
        assert_eq!(results[1].id, CallId::Int(1));
        assert!(results[1].output.contains("unknown tool"));
        assert!(results[1].output.contains("nonexistent"));
    }

    #[test]
    fn missing_required_parameter_skips_invocation() {
        let calls_made = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();
        registry
            .register(Arc::new(CountingTool {
                calls: Arc::clone(&calls_made),
            }))
            .unwrap();

        let call = ToolCall {
            name: "counting".to_string(),
            arguments: json!({}),
            id: CallId::Int(0),
        };

        let results = tokio_test::block_on(invoke_batch(&[call], &registry));

        assert!(results[0].output.contains("missing required parameter 'query'"));
        assert_eq!(calls_made.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn null_argument_counts_as_missing() {
        let calls_made = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();
        registry
            .register(Arc::new(CountingTool {
                calls: Arc::clone(&calls_made),
            }))
            .unwrap();

        let call = ToolCall {
            name: "counting".to_string(),
            arguments: json!({"query": null}),
            id: CallId::Int(0),
        };

        let results = tokio_test::block_on(invoke_batch(&[call], &registry));
        assert!(results[0].output.contains("missing required parameter"));
        assert_eq!(calls_made.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn tool_failure_is_captured_as_output() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(FailingTool)).unwrap();

        let call = ToolCall {
            name: "failing".to_string(),
            arguments: json!({}),
            id: CallId::Str("f1".to_string()),
        };

        let results = invoke_batch(&[call], &registry).await;
        assert_eq!(
            results[0].output,
            "Error executing tool failing: backend unavailable"
        );
    }
}
