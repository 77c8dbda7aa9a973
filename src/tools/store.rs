//! Port to the external data service.
//!
//! The façade reads and writes task data only through these three
//! operations. Filtering and analysis happen in-process on what
//! `list_tasks` returns.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::{ProjectId, Task, TaskId, TaskStatus};

/// Result type for data-service operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Narrow command set of the external data service.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Stores a new task under a project and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Duplicate`] when the task id already exists.
    async fn create_task(&self, project: &ProjectId, task: &Task) -> StoreResult<Task>;

    /// Returns every task of a project, closed ones included. An unknown
    /// project has no tasks.
    async fn list_tasks(&self, project: &ProjectId) -> StoreResult<Vec<Task>>;

    /// Sets the status of a task and returns the updated record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the task does not exist.
    async fn update_task_status(&self, id: TaskId, status: TaskStatus) -> StoreResult<Task>;
}

/// Errors returned by data-service adapters.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The service could not be reached or answered with garbage.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("task not found: {0}")]
    NotFound(TaskId),

    #[error("duplicate task identifier: {0}")]
    Duplicate(TaskId),

    /// Storage-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
