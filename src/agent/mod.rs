//! Agent module - the core reason-act loop and its collaborators.
//!
//! The loop per round:
//! 1. Call the model with the running history
//! 2. Sanitize the raw output (simulation guard)
//! 3. Extract `thought` / `tool_call` / `response` tags
//! 4. If tool calls are present, execute them and append the observation
//! 5. Repeat until a response appears or the round budget runs out

pub mod extraction;
pub mod guard;
pub mod invoker;
pub mod orchestra;
mod prompt;
mod react;

pub use prompt::build_system_prompt;
pub use react::ReactAgent;
