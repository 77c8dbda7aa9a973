//! The tool façade.
//!
//! Owns all I/O. Every tool validates its input before touching the data
//! service, bounds each service call with a timeout and the agent's
//! cancellation token, and reports failures instead of retrying them.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::DEFAULT_STORE_TIMEOUT_SECS;
use crate::core::{Domain, ProjectId, Task, TaskId, TaskStatus};
use crate::engine::{Assignment, Engine, HealthReport, StatusBreakdown, Synthesis};
use crate::error::{Error, Result};
use crate::tools::schema::{
    AnalyzeProgressInput, BreakDownTaskInput, ClassifyDomainInput, ClassifyDomainOutput,
    ListTasksInput, ListTasksOutput, PersistedTasks, PlanProjectInput, ResolveAssigneeInput,
    SynthesizeTasksInput, ToolCall, ToolOutput, ToolResult, UpdateTaskStatusInput,
    UpdateTaskStatusOutput,
};
use crate::tools::store::{StoreError, StoreResult, TaskStore};
use crate::util::bounded;

/// The task agent: decision engine plus data-service access.
#[derive(Clone)]
pub struct TaskAgent {
    engine: Arc<Engine>,
    store: Arc<dyn TaskStore>,
    timeout: Duration,
    cancel: CancellationToken,
}

impl std::fmt::Debug for TaskAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskAgent")
            .field("timeout", &self.timeout)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl TaskAgent {
    pub fn new(engine: Arc<Engine>, store: Arc<dyn TaskStore>) -> Self {
        Self {
            engine,
            store,
            timeout: Duration::from_secs(DEFAULT_STORE_TIMEOUT_SECS),
            cancel: CancellationToken::new(),
        }
    }

    /// Upper bound on each data-service call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Token that aborts in-flight data-service calls when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Dispatch a structured call and wrap the outcome.
    pub async fn invoke(&self, call: ToolCall) -> ToolResult {
        let tool = call.name();
        tracing::info!(tool, "tool invoked");
        let outcome = match call {
            ToolCall::ClassifyDomain(input) => {
                self.classify_domain(&input).map(ToolOutput::Classification)
            }
            ToolCall::SynthesizeTasks(input) => {
                self.synthesize_tasks(&input).map(ToolOutput::Synthesis)
            }
            ToolCall::ResolveAssignee(input) => {
                self.resolve_assignee(&input).map(ToolOutput::Assignment)
            }
            ToolCall::AnalyzeProgress(input) => {
                self.analyze_progress(&input).await.map(ToolOutput::Health)
            }
            ToolCall::PlanProject(input) => {
                self.plan_project(&input).await.map(ToolOutput::Persisted)
            }
            ToolCall::BreakDownTask(input) => {
                self.break_down_task(&input).await.map(ToolOutput::Persisted)
            }
            ToolCall::ListTasks(input) => self.list_tasks(&input).await.map(ToolOutput::Tasks),
            ToolCall::UpdateTaskStatus(input) => {
                self.update_task_status(&input).await.map(ToolOutput::Updated)
            }
        };

        match outcome {
            Ok(output) => ToolResult::success(tool, output),
            Err(err) => {
                match &err {
                    Error::InvalidInput(_) | Error::TaskNotFound(_) => {
                        tracing::warn!(tool, %err, "tool rejected call")
                    }
                    _ => tracing::error!(tool, %err, "tool failed"),
                }
                ToolResult::failure(tool, &err)
            }
        }
    }

    pub fn classify_domain(&self, input: &ClassifyDomainInput) -> Result<ClassifyDomainOutput> {
        require_text("description", &input.description)?;
        let classifier = self.engine.classifier();
        Ok(ClassifyDomainOutput {
            domain: classifier.classify(&input.description),
            scores: classifier.scores(&input.description),
        })
    }

    pub fn synthesize_tasks(&self, input: &SynthesizeTasksInput) -> Result<Synthesis> {
        require_text("description", &input.description)?;
        let domain = input.domain.as_deref().map(Domain::parse_or_generic);
        self.engine
            .synthesize_detailed(&input.description, domain, &input.existing_tasks)
    }

    pub fn resolve_assignee(&self, input: &ResolveAssigneeInput) -> Result<Assignment> {
        require_text("title", &input.title)?;
        Ok(self.engine.explain_assignee(&input.to_task()))
    }

    /// Analyze an inline snapshot, or read one stored project.
    pub async fn analyze_progress(&self, input: &AnalyzeProgressInput) -> Result<HealthReport> {
        match (&input.project_id, &input.tasks) {
            (Some(_), Some(_)) => Err(Error::invalid(
                "provide either project_id or tasks, not both",
            )),
            (None, None) => Err(Error::invalid("provide a project_id or a list of tasks")),
            (None, Some(tasks)) => self.engine.analyze(tasks),
            (Some(raw), None) => {
                let project = ProjectId::parse(raw)?;
                let tasks = self.fetch(&project).await?;
                self.engine.analyze(&tasks)
            }
        }
    }

    /// Synthesize a project's tasks and create the ones it lacks.
    pub async fn plan_project(&self, input: &PlanProjectInput) -> Result<PersistedTasks> {
        let project = ProjectId::parse(&input.project_id)?;
        require_text("description", &input.description)?;
        let domain = input.domain.as_deref().map(Domain::parse_or_generic);

        let existing = self.fetch(&project).await?;
        let synthesis = self
            .engine
            .synthesize_detailed(&input.description, domain, &existing)?;
        self.persist(&project, synthesis).await
    }

    /// Break one task into sub-tasks and create them.
    pub async fn break_down_task(&self, input: &BreakDownTaskInput) -> Result<PersistedTasks> {
        let project = ProjectId::parse(&input.project_id)?;
        require_text("title", &input.title)?;

        let existing = self.fetch(&project).await?;
        let synthesis = self
            .engine
            .break_down(&input.title, &input.description, &existing)?;
        self.persist(&project, synthesis).await
    }

    pub async fn list_tasks(&self, input: &ListTasksInput) -> Result<ListTasksOutput> {
        let project = ProjectId::parse(&input.project_id)?;
        let status = input
            .status
            .as_deref()
            .map(str::parse::<TaskStatus>)
            .transpose()?;

        let tasks = self.fetch(&project).await?;
        let breakdown = StatusBreakdown::from_tasks(&tasks);
        let tasks = match status {
            Some(status) => tasks.into_iter().filter(|t| t.status == status).collect(),
            None => tasks,
        };
        Ok(ListTasksOutput {
            project_id: project.to_string(),
            tasks,
            breakdown,
        })
    }

    /// Find a task by id or title within a project and set its status.
    pub async fn update_task_status(
        &self,
        input: &UpdateTaskStatusInput,
    ) -> Result<UpdateTaskStatusOutput> {
        let project = ProjectId::parse(&input.project_id)?;
        require_text("task", &input.task)?;
        let status: TaskStatus = input.status.parse()?;

        let tasks = self.fetch(&project).await?;
        let found = find_task(&tasks, &input.task).ok_or_else(|| {
            Error::TaskNotFound(format!("no task matching '{}' in project {}", input.task.trim(), project))
        })?;
        let previous_status = found.status;
        let id = found.id;

        let task = self
            .guarded(
                "update_task_status",
                format!("task {}", id),
                self.store.update_task_status(id, status),
            )
            .await?;
        tracing::info!(task = %id.short(), from = %previous_status, to = %status, "task status updated");
        Ok(UpdateTaskStatusOutput {
            previous_status,
            task,
        })
    }

    async fn fetch(&self, project: &ProjectId) -> Result<Vec<Task>> {
        let tasks = self
            .guarded(
                "list_tasks",
                format!("project {}", project),
                self.store.list_tasks(project),
            )
            .await?;
        tracing::debug!(project = %project, count = tasks.len(), "fetched tasks");
        Ok(tasks)
    }

    /// Create tasks one at a time, stopping at the first failure.
    async fn persist(&self, project: &ProjectId, synthesis: Synthesis) -> Result<PersistedTasks> {
        let total = synthesis.tasks.len();
        let mut created = Vec::with_capacity(total);
        for task in &synthesis.tasks {
            let stored = self
                .guarded(
                    "create_task",
                    format!("project {}", project),
                    self.store.create_task(project, task),
                )
                .await
                .map_err(|e| with_progress(e, created.len(), total))?;
            created.push(stored);
        }

        tracing::info!(
            project = %project,
            domain = %synthesis.domain,
            created = created.len(),
            reused = synthesis.reused.len(),
            "tasks persisted"
        );
        Ok(PersistedTasks {
            project_id: project.to_string(),
            domain: synthesis.domain,
            breakdown: synthesis.breakdown,
            created,
            reused: synthesis.reused,
        })
    }

    /// Bound one data-service call and translate its failure.
    async fn guarded<T, F>(&self, operation: &'static str, target: String, fut: F) -> Result<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        match bounded(operation, self.timeout, &self.cancel, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(StoreError::NotFound(id))) => Err(Error::TaskNotFound(id.to_string())),
            Ok(Err(err)) => Err(Error::UpstreamUnavailable {
                operation,
                target,
                reason: err.to_string(),
            }),
            Err(Error::Timeout(after)) => Err(Error::UpstreamUnavailable {
                operation,
                target,
                reason: format!("timed out after {:?}", after),
            }),
            Err(err) => Err(err),
        }
    }
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn with_progress(err: Error, created: usize, total: usize) -> Error {
    match err {
        Error::UpstreamUnavailable {
            operation,
            target,
            reason,
        } => Error::UpstreamUnavailable {
            operation,
            target,
            reason: format!("{}; {} of {} tasks created", reason, created, total),
        },
        other => other,
    }
}

/// Match by id, then exact title, then the first title containing the
/// query, case-insensitively.
fn find_task<'a>(tasks: &'a [Task], query: &str) -> Option<&'a Task> {
    let query = query.trim();
    if let Ok(id) = query.parse::<TaskId>() {
        if let Some(task) = tasks.iter().find(|t| t.id == id) {
            return Some(task);
        }
    }
    if let Some(task) = tasks.iter().find(|t| t.title == query) {
        return Some(task);
    }
    let needle = query.to_lowercase();
    tasks
        .iter()
        .find(|t| t.title.to_lowercase().contains(&needle))
}
