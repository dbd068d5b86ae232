//! # Wayfarer
//!
//! A ReAct (Reason+Act) agent service for trip planning and travel-blog
//! generation.
//!
//! This library provides:
//! - An HTTP API for trip-planning and blog-generation queries
//! - A tag-protocol agent loop that alternates model reasoning with real
//!   tool execution
//! - Thin tool wrappers over travel data APIs (hotels, activities, search,
//!   scraping, weather, image analysis)
//!
//! ## Architecture
//!
//! The agent follows the ReAct pattern:
//! 1. Receive a query via the API
//! 2. Seed the chat history with the system prompt and tool descriptions
//! 3. Call the model, sanitize its output, extract `thought` / `tool_call` /
//!    `response` tags
//! 4. Execute requested tools, feed observations back, repeat until a final
//!    response appears or the round budget runs out
//!
//! ## Example
//!
//! ```rust,ignore
//! use wayfarer::{config::Config, planner::TripPlanner};
//!
//! let config = Config::from_env()?;
//! let model = wayfarer::llm::client_from_config(&config)?;
//! let planner = TripPlanner::new(&config, model, reqwest::Client::new())?;
//! let plan = planner.process_query("Plan a 3-day trip to Rome", None).await;
//! ```

pub mod agent;
pub mod api;
pub mod blog;
pub mod config;
pub mod llm;
pub mod planner;
pub mod tools;

pub use config::Config;
