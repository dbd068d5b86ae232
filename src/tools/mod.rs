//! Tool trait and registry - the capabilities exposed to the model.
//!
//! Tools are constructed once at startup, registered into an immutable
//! [`ToolRegistry`], and shared read-only by every agent loop. Each tool
//! returns a string: pre-serialized JSON on success, human-readable error
//! text otherwise.

mod activities;
mod hotels;
mod scrape;
mod search;
mod vision;
mod weather;

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use activities::ActivitySearch;
pub use hotels::HotelSearch;
pub use scrape::WebsiteContent;
pub use search::{ImageSearch, WebSearch};
pub use vision::DescribeImage;
pub use weather::WeatherInfo;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("tool '{0}' is already registered")]
    DuplicateTool(String),

    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

/// One parameter in a tool's call signature.
#[derive(Debug, Clone)]
pub struct ToolParameter {
    pub name: &'static str,
    /// JSON type name shown to the model ("string", "integer", ...).
    pub kind: &'static str,
    pub description: &'static str,
    pub required: bool,
}

impl ToolParameter {
    pub const fn required(name: &'static str, kind: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, kind: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: false,
        }
    }
}

/// An external capability the model can call by name.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// The call signature, in declaration order.
    fn parameters(&self) -> &[ToolParameter];

    /// Execute the tool. Implementations report remote-API failures as
    /// `Ok` strings when they can; `Err` is reserved for local failures and
    /// is captured by the invoker either way.
    async fn invoke(&self, args: &Value) -> anyhow::Result<String>;
}

/// Registry of available tools.
///
/// Populated once at startup, immutable and shareable afterwards.
/// Iteration and rendering follow registration order so prompts are
/// reproducible.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Names must be unique.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(ToolError::DuplicateTool(name));
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Look up a tool by name.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Tool>, ToolError> {
        self.index
            .get(name)
            .map(|&i| Arc::clone(&self.tools[i]))
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }

    /// Render every tool's name, description, and call signature into the
    /// block injected into the system prompt, in registration order.
    pub fn describe_all(&self) -> String {
        let mut out = String::new();
        for tool in &self.tools {
            let _ = writeln!(out, "- {}: {}", tool.name(), tool.description());
            for param in tool.parameters() {
                let req = if param.required { "required" } else { "optional" };
                let _ = writeln!(
                    out,
                    "    {} ({}, {}): {}",
                    param.name, param.kind, req, param.description
                );
            }
        }
        out
    }

    /// Registered tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A tool that echoes its "value" argument, for registry and loop tests.
    pub struct EchoTool {
        pub tool_name: &'static str,
    }

    pub const ECHO_PARAMS: [ToolParameter; 1] =
        [ToolParameter::required("value", "string", "Value to echo back")];

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            self.tool_name
        }

        fn description(&self) -> &str {
            "Echo the given value"
        }

        fn parameters(&self) -> &[ToolParameter] {
            &ECHO_PARAMS
        }

        async fn invoke(&self, args: &Value) -> anyhow::Result<String> {
            let value = args["value"].as_str().unwrap_or("default");
            Ok(format!("{}:{}", self.tool_name, value))
        }
    }
}
