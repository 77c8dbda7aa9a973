//! Task data model.
//!
//! Tasks are transient inputs and outputs of the engine. Durable ownership
//! belongs to the external data service; nothing here caches them.

use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::domain::Domain;
use crate::error::{Error, Result};

/// Unique identifier for a task.
///
/// Uses UUID v4 for generation and provides a short form display
/// for human-readable output.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct TaskId(pub Uuid);

impl TaskId {
    /// Create a new unique task identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Return first 8 characters of the UUID for display.
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Identifier of a project in the external data service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ProjectId(pub String);

impl ProjectId {
    /// Validate and wrap a project identifier. Blank ids are rejected.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid("project id must not be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Workflow status of a task.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    Doing,
    Review,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::Doing,
        TaskStatus::Review,
        TaskStatus::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Doing => "doing",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Todo
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| {
                let valid: Vec<&str> = TaskStatus::ALL.iter().map(TaskStatus::as_str).collect();
                Error::invalid(format!(
                    "invalid status '{}'; valid statuses are: {}",
                    wanted,
                    valid.join(", ")
                ))
            })
    }
}

/// Coarse effort estimate.
///
/// Ordered so that threshold comparisons (`effort > Medium`) read naturally.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Effort {
    Low,
    Medium,
    High,
}

impl Default for Effort {
    fn default() -> Self {
        Self::Medium
    }
}

impl std::fmt::Display for Effort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Effort::Low => write!(f, "low"),
            Effort::Medium => write!(f, "medium"),
            Effort::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for Effort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Effort::Low),
            "medium" | "moderate" => Ok(Effort::Medium),
            "high" => Ok(Effort::High),
            other => Err(Error::invalid(format!(
                "invalid effort '{}'; expected low, medium or high",
                other
            ))),
        }
    }
}

/// The actor responsible for executing a task.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum AssigneeType {
    /// A human; judgment-heavy or high-complexity work.
    User,
    /// An AI coding assistant; code-generation-shaped work of moderate size.
    #[serde(rename = "AI IDE Agent", alias = "AI_IDE_Agent")]
    AiIdeAgent,
    /// The autonomous agent itself; routine and coordination work.
    Archon,
}

impl AssigneeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssigneeType::User => "User",
            AssigneeType::AiIdeAgent => "AI IDE Agent",
            AssigneeType::Archon => "Archon",
        }
    }
}

impl Default for AssigneeType {
    fn default() -> Self {
        Self::User
    }
}

impl std::fmt::Display for AssigneeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Task {
    /// Unique identifier for this task.
    pub id: TaskId,
    /// Short human-readable title.
    pub title: String,
    /// What the task should accomplish.
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub domain: Domain,
    #[serde(default)]
    pub estimated_effort: Effort,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub assignee: AssigneeType,
    /// Tasks that must be done before this one can make progress.
    #[serde(default)]
    pub depends_on: BTreeSet<TaskId>,
    /// Feature tag such as `authentication` or `testing`.
    #[serde(default)]
    pub feature: String,
    /// Priority, higher first.
    #[serde(default)]
    pub task_order: u8,
}

impl Task {
    /// Create a todo task with a fresh id and default attributes.
    pub fn new(title: &str, description: &str) -> Self {
        Self {
            id: TaskId::new(),
            title: title.to_string(),
            description: description.to_string(),
            domain: Domain::Generic,
            estimated_effort: Effort::Medium,
            status: TaskStatus::Todo,
            assignee: AssigneeType::User,
            depends_on: BTreeSet::new(),
            feature: String::new(),
            task_order: 0,
        }
    }

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_effort(mut self, effort: Effort) -> Self {
        self.estimated_effort = effort;
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_assignee(mut self, assignee: AssigneeType) -> Self {
        self.assignee = assignee;
        self
    }

    /// Add a dependency on another task.
    pub fn with_dependency(mut self, id: TaskId) -> Self {
        self.depends_on.insert(id);
        self
    }

    pub fn is_done(&self) -> bool {
        self.status.is_done()
    }

    /// Lowercased title and description, the text the decision rules inspect.
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.title, self.description).to_lowercase()
    }
}
