//! System prompt templates for the agent.

use crate::tools::ToolRegistry;

/// Build the system prompt: protocol instructions, tool signatures, and the
/// task-specific prompt.
pub fn build_system_prompt(task_prompt: &str, tools: &ToolRegistry) -> String {
    let tool_descriptions = tools.describe_all();

    format!(
        r#"You operate in a strict reason-act loop. Every turn you emit exactly one of:

1. A tool call, optionally preceded by your reasoning:
<thought>why you need the tool</thought>
<tool_call>{{"name": "<tool_name>", "arguments": {{...}}, "id": 0}}</tool_call>

You may emit several <tool_call> tags in one turn for independent lookups; give each a distinct numeric id.

2. Your final answer, once you have everything you need:
<response>the final answer</response>

## Available Tools

{tool_descriptions}
## Rules

1. After emitting a tool call, STOP. The results arrive in the next turn inside an <observation> tag, as JSON keyed by your call ids.
2. NEVER invent, assume, or simulate tool results. Only use data that actually arrived in an <observation>.
3. Only call tools listed above, with the documented parameters.
4. Use real data from observations in your final response; if a tool failed, adapt or say what is missing.

## Task

{task_prompt}"#,
        tool_descriptions = tool_descriptions,
        task_prompt = task_prompt
    )
}
