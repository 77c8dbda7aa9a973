//! In-memory data service for tests and demos.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::core::{ProjectId, Task, TaskId, TaskStatus};
use crate::tools::store::{StoreError, StoreResult, TaskStore};

/// Thread-safe in-memory task store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    /// Tasks per project, in creation order.
    projects: HashMap<ProjectId, Vec<Task>>,
    owner: HashMap<TaskId, ProjectId>,
}

impl InMemoryTaskStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with one project's tasks.
    pub fn with_tasks(project: &ProjectId, tasks: Vec<Task>) -> Self {
        let store = Self::new();
        if let Ok(mut state) = store.state.write() {
            for task in &tasks {
                state.owner.insert(task.id, project.clone());
            }
            state.projects.insert(project.clone(), tasks);
        }
        store
    }
}

fn poisoned(err: impl std::fmt::Display) -> StoreError {
    StoreError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create_task(&self, project: &ProjectId, task: &Task) -> StoreResult<Task> {
        let mut state = self.state.write().map_err(poisoned)?;
        if state.owner.contains_key(&task.id) {
            return Err(StoreError::Duplicate(task.id));
        }
        state.owner.insert(task.id, project.clone());
        state
            .projects
            .entry(project.clone())
            .or_default()
            .push(task.clone());
        Ok(task.clone())
    }

    async fn list_tasks(&self, project: &ProjectId) -> StoreResult<Vec<Task>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.projects.get(project).cloned().unwrap_or_default())
    }

    async fn update_task_status(&self, id: TaskId, status: TaskStatus) -> StoreResult<Task> {
        let mut state = self.state.write().map_err(poisoned)?;
        let project = state.owner.get(&id).cloned().ok_or(StoreError::NotFound(id))?;
        let task = state
            .projects
            .get_mut(&project)
            .and_then(|tasks| tasks.iter_mut().find(|t| t.id == id))
            .ok_or(StoreError::NotFound(id))?;
        task.status = status;
        Ok(task.clone())
    }
}
