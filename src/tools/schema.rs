//! Wire types for tool calls and their results.
//!
//! Calls arrive as `{"tool": "<name>", "input": {...}}`. Every result carries
//! the tool name, an `ok` flag and either an `output` or an `error`.

use schemars::schema::RootSchema;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use crate::core::{Domain, Effort, Task, TaskStatus};
use crate::engine::{Assignment, BreakdownKind, DomainScore, HealthReport, ReusedTask, StatusBreakdown, Synthesis};
use crate::error::Error;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClassifyDomainInput {
    /// Free-text project or task description.
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClassifyDomainOutput {
    pub domain: Domain,
    pub scores: Vec<DomainScore>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SynthesizeTasksInput {
    pub description: String,
    /// Domain override. Unrecognised names fall back to `generic`.
    #[serde(default)]
    pub domain: Option<String>,
    /// Tasks that already exist, used for de-duplication and linking.
    #[serde(default)]
    pub existing_tasks: Vec<Task>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResolveAssigneeInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub estimated_effort: Effort,
    #[serde(default)]
    pub domain: Option<String>,
}

impl ResolveAssigneeInput {
    pub fn to_task(&self) -> Task {
        let domain = self
            .domain
            .as_deref()
            .map(Domain::parse_or_generic)
            .unwrap_or_default();
        Task::new(&self.title, &self.description)
            .with_effort(self.estimated_effort)
            .with_domain(domain)
    }
}

/// Analyze either a stored project or an inline snapshot, not both.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeProgressInput {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub tasks: Option<Vec<Task>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PlanProjectInput {
    pub project_id: String,
    pub description: String,
    #[serde(default)]
    pub domain: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BreakDownTaskInput {
    pub project_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Tasks written to the data service by a planning tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PersistedTasks {
    pub project_id: String,
    pub domain: Domain,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<BreakdownKind>,
    pub created: Vec<Task>,
    #[serde(default)]
    pub reused: Vec<ReusedTask>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListTasksInput {
    pub project_id: String,
    /// Only return tasks with this status.
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListTasksOutput {
    pub project_id: String,
    pub tasks: Vec<Task>,
    /// Counts over the whole project, regardless of the status filter.
    pub breakdown: StatusBreakdown,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UpdateTaskStatusInput {
    pub project_id: String,
    /// Task id, exact title, or a case-insensitive fragment of the title.
    pub task: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UpdateTaskStatusOutput {
    pub previous_status: TaskStatus,
    pub task: Task,
}

/// A structured tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "tool", content = "input", rename_all = "snake_case")]
pub enum ToolCall {
    ClassifyDomain(ClassifyDomainInput),
    SynthesizeTasks(SynthesizeTasksInput),
    ResolveAssignee(ResolveAssigneeInput),
    AnalyzeProgress(AnalyzeProgressInput),
    PlanProject(PlanProjectInput),
    BreakDownTask(BreakDownTaskInput),
    ListTasks(ListTasksInput),
    UpdateTaskStatus(UpdateTaskStatusInput),
}

impl ToolCall {
    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::ClassifyDomain(_) => "classify_domain",
            ToolCall::SynthesizeTasks(_) => "synthesize_tasks",
            ToolCall::ResolveAssignee(_) => "resolve_assignee",
            ToolCall::AnalyzeProgress(_) => "analyze_progress",
            ToolCall::PlanProject(_) => "plan_project",
            ToolCall::BreakDownTask(_) => "break_down_task",
            ToolCall::ListTasks(_) => "list_tasks",
            ToolCall::UpdateTaskStatus(_) => "update_task_status",
        }
    }
}

/// Successful output of any tool.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    Classification(ClassifyDomainOutput),
    Synthesis(Synthesis),
    Assignment(Assignment),
    Health(HealthReport),
    Persisted(PersistedTasks),
    Tasks(ListTasksOutput),
    Updated(UpdateTaskStatusOutput),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolError {
    /// Machine-readable kind such as `invalid_input` or `upstream_unavailable`.
    pub kind: String,
    pub message: String,
}

impl From<&Error> for ToolError {
    fn from(err: &Error) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolResult {
    pub tool: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<ToolOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
}

impl ToolResult {
    pub fn success(tool: &str, output: ToolOutput) -> Self {
        Self {
            tool: tool.to_string(),
            ok: true,
            output: Some(output),
            error: None,
        }
    }

    pub fn failure(tool: &str, err: &Error) -> Self {
        Self {
            tool: tool.to_string(),
            ok: false,
            output: None,
            error: Some(ToolError::from(err)),
        }
    }
}

/// What a tool does to the data service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SideEffects {
    None,
    Read,
    Write,
    ReadWrite,
}

/// Registration record for one tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub side_effects: SideEffects,
    pub input_schema: RootSchema,
    pub output_schema: RootSchema,
}

/// Every tool the façade exposes.
pub fn tool_specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "classify_domain",
            description: "Classify a project or task description into auth, api, frontend, database or generic",
            side_effects: SideEffects::None,
            input_schema: schema_for!(ClassifyDomainInput),
            output_schema: schema_for!(ClassifyDomainOutput),
        },
        ToolSpec {
            name: "synthesize_tasks",
            description: "Expand a description into an ordered, dependency-linked task list without saving it",
            side_effects: SideEffects::None,
            input_schema: schema_for!(SynthesizeTasksInput),
            output_schema: schema_for!(Synthesis),
        },
        ToolSpec {
            name: "resolve_assignee",
            description: "Choose User, AI IDE Agent or Archon for a task and explain the rule that decided",
            side_effects: SideEffects::None,
            input_schema: schema_for!(ResolveAssigneeInput),
            output_schema: schema_for!(Assignment),
        },
        ToolSpec {
            name: "analyze_progress",
            description: "Score project health and rank recommendations for a stored project or an inline task list",
            side_effects: SideEffects::Read,
            input_schema: schema_for!(AnalyzeProgressInput),
            output_schema: schema_for!(HealthReport),
        },
        ToolSpec {
            name: "plan_project",
            description: "Synthesize tasks for a project and create the ones it does not already have. Writes one task record per created task, in order, and stops at the first failed write; the error reports how many were created",
            side_effects: SideEffects::ReadWrite,
            input_schema: schema_for!(PlanProjectInput),
            output_schema: schema_for!(PersistedTasks),
        },
        ToolSpec {
            name: "break_down_task",
            description: "Break one task into sub-tasks and create them in the project. Writes one task record per sub-task, in order, and stops at the first failed write; the error reports how many were created",
            side_effects: SideEffects::ReadWrite,
            input_schema: schema_for!(BreakDownTaskInput),
            output_schema: schema_for!(PersistedTasks),
        },
        ToolSpec {
            name: "list_tasks",
            description: "List a project's tasks, optionally filtered by status",
            side_effects: SideEffects::Read,
            input_schema: schema_for!(ListTasksInput),
            output_schema: schema_for!(ListTasksOutput),
        },
        ToolSpec {
            name: "update_task_status",
            description: "Move a task, found by id or title, to todo, doing, review or done",
            side_effects: SideEffects::ReadWrite,
            input_schema: schema_for!(UpdateTaskStatusInput),
            output_schema: schema_for!(UpdateTaskStatusOutput),
        },
    ]
}
