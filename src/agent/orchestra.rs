//! Multi-agent orchestration - bookkeeping over the core loop.
//!
//! A shared directory maps agent names to role-tagged [`ReactAgent`]
//! instances. Registration and lookup can race across request handlers, so
//! the map lives behind a mutex. Independent tasks fan out over a bounded
//! pool; reports come back in task order.

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::sync::Mutex;

use super::ReactAgent;

/// How many tasks run concurrently during a fan-out.
const DEFAULT_MAX_WORKERS: usize = 4;

/// Role an agent plays in a hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Coordinator,
    Specialist,
    Validator,
}

/// A named agent in the directory.
pub struct RegisteredAgent {
    pub name: String,
    pub role: AgentRole,
    pub specialization: Option<String>,
    pub agent: Arc<ReactAgent>,
}

/// A unit of work for one named agent.
#[derive(Debug, Clone)]
pub struct AgentTask {
    pub id: String,
    pub agent: String,
    pub content: String,
    pub max_rounds: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Completed,
    Failed,
}

/// Outcome of one fanned-out task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskReport {
    pub id: String,
    pub agent: String,
    pub status: TaskStatus,
    pub output: String,
}

/// Shared name -> agent map, safe to mutate at runtime.
#[derive(Clone, Default)]
pub struct AgentDirectory {
    agents: Arc<Mutex<HashMap<String, Arc<RegisteredAgent>>>>,
}

impl AgentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent, replacing any previous entry with the same name.
    pub async fn register(&self, agent: RegisteredAgent) {
        self.agents
            .lock()
            .await
            .insert(agent.name.clone(), Arc::new(agent));
    }

    pub async fn get(&self, name: &str) -> Option<Arc<RegisteredAgent>> {
        self.agents.lock().await.get(name).cloned()
    }

    pub async fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.agents.lock().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// All specialists whose specialization mentions `keyword`.
    pub async fn specialists_matching(&self, keyword: &str) -> Vec<Arc<RegisteredAgent>> {
        let keyword = keyword.to_lowercase();
        self.agents
            .lock()
            .await
            .values()
            .filter(|a| {
                a.role == AgentRole::Specialist
                    && a.specialization
                        .as_deref()
                        .is_some_and(|s| s.to_lowercase().contains(&keyword))
            })
            .cloned()
            .collect()
    }

    /// Run independent tasks concurrently over a bounded worker pool.
    ///
    /// Reports are returned in task order regardless of completion order.
    /// A task naming an unknown agent, or whose run fails, produces a
    /// `Failed` report; it never aborts the other tasks.
    pub async fn run_parallel(&self, tasks: Vec<AgentTask>) -> Vec<TaskReport> {
        stream::iter(tasks.into_iter().map(|task| self.run_task(task)))
            .buffered(DEFAULT_MAX_WORKERS)
            .collect()
            .await
    }

    async fn run_task(&self, task: AgentTask) -> TaskReport {
        let Some(registered) = self.get(&task.agent).await else {
            return TaskReport {
                id: task.id,
                agent: task.agent.clone(),
                status: TaskStatus::Failed,
                output: format!("no agent named '{}' is registered", task.agent),
            };
        };

        tracing::info!(task = %task.id, agent = %task.agent, "starting task");

        match registered.agent.run(&task.content, task.max_rounds).await {
            Ok(output) => TaskReport {
                id: task.id,
                agent: task.agent,
                status: TaskStatus::Completed,
                output,
            },
            Err(e) => TaskReport {
                id: task.id,
                agent: task.agent,
                status: TaskStatus::Failed,
                output: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::llm::{ChatMessage, ModelClient, ModelError};
    use crate::tools::ToolRegistry;

    /// A model that always answers with the same response tag.
    struct CannedModel {
        reply: String,
    }

    #[async_trait]
    impl ModelClient for CannedModel {
        async fn call(&self, _history: &[ChatMessage]) -> Result<String, ModelError> {
            Ok(format!("<response>{}</response>", self.reply))
        }
    }

    fn canned_agent(reply: &str) -> Arc<ReactAgent> {
        Arc::new(ReactAgent::new(
            Arc::new(CannedModel {
                reply: reply.to_string(),
            }),
            Arc::new(ToolRegistry::new()),
            "Answer tasks.",
        ))
    }

    async fn directory_with(name: &str, role: AgentRole, reply: &str) -> AgentDirectory {
        let directory = AgentDirectory::new();
        directory
            .register(RegisteredAgent {
                name: name.to_string(),
                role,
                specialization: None,
                agent: canned_agent(reply),
            })
            .await;
        directory
    }

    #[tokio::test]
    async fn register_and_lookup() {
        let directory = directory_with("hotels", AgentRole::Specialist, "ok").await;
        assert!(directory.get("hotels").await.is_some());
        assert!(directory.get("flights").await.is_none());
        assert_eq!(directory.list().await, vec!["hotels"]);
    }

    #[tokio::test]
    async fn reregistering_replaces_entry() {
        let directory = directory_with("planner", AgentRole::Coordinator, "v1").await;
        directory
            .register(RegisteredAgent {
                name: "planner".to_string(),
                role: AgentRole::Validator,
                specialization: None,
                agent: canned_agent("v2"),
            })
            .await;

        let entry = directory.get("planner").await.unwrap();
        assert_eq!(entry.role, AgentRole::Validator);
        assert_eq!(directory.list().await.len(), 1);
    }

    #[tokio::test]
    async fn specialists_matching_filters_by_keyword() {
        let directory = AgentDirectory::new();
        directory
            .register(RegisteredAgent {
                name: "hotels".to_string(),
                role: AgentRole::Specialist,
                specialization: Some("Hotel accommodation booking".to_string()),
                agent: canned_agent("h"),
            })
            .await;
        directory
            .register(RegisteredAgent {
                name: "lead".to_string(),
                role: AgentRole::Coordinator,
                specialization: Some("hotel coordination".to_string()),
                agent: canned_agent("c"),
            })
            .await;

        let matches = directory.specialists_matching("hotel").await;
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "hotels");
    }

    #[tokio::test]
    async fn run_parallel_keeps_task_order_and_isolates_failures() {
        let directory = directory_with("worker", AgentRole::Specialist, "done").await;

        let tasks = vec![
            AgentTask {
                id: "t1".to_string(),
                agent: "worker".to_string(),
                content: "first".to_string(),
                max_rounds: 3,
            },
            AgentTask {
                id: "t2".to_string(),
                agent: "ghost".to_string(),
                content: "second".to_string(),
                max_rounds: 3,
            },
            AgentTask {
                id: "t3".to_string(),
                agent: "worker".to_string(),
                content: "third".to_string(),
                max_rounds: 3,
            },
        ];

        let reports = directory.run_parallel(tasks).await;

        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].id, "t1");
        assert_eq!(reports[0].status, TaskStatus::Completed);
        assert_eq!(reports[0].output, "done");
        assert_eq!(reports[1].id, "t2");
        assert_eq!(reports[1].status, TaskStatus::Failed);
        assert!(reports[1].output.contains("ghost"));
        assert_eq!(reports[2].id, "t3");
        assert_eq!(reports[2].status, TaskStatus::Completed);
    }
}
