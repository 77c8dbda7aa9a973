//! Test fixtures for integration tests.
//!
//! Provides stores that count, delay or fail data-service calls, plus
//! helpers for building agents and task chains.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use taskagent::core::{ProjectId, Task, TaskId, TaskStatus};
use taskagent::engine::Engine;
use taskagent::tools::{InMemoryTaskStore, StoreError, StoreResult, TaskAgent, TaskStore};

/// Build an agent over the built-in engine.
pub fn agent(store: Arc<dyn TaskStore>) -> TaskAgent {
    TaskAgent::new(Arc::new(Engine::builtin().clone()), store)
}

pub fn project(raw: &str) -> ProjectId {
    ProjectId::parse(raw).expect("valid project id")
}

/// Tasks where each one depends on the previous.
pub fn chain(titles: &[&str]) -> Vec<Task> {
    let mut tasks: Vec<Task> = Vec::new();
    for title in titles {
        let mut task = Task::new(title, "");
        if let Some(prev) = tasks.last() {
            task = task.with_dependency(prev.id);
        }
        tasks.push(task);
    }
    tasks
}

/// Per-operation call counts.
#[derive(Debug, Default)]
pub struct CallCounts {
    pub create: AtomicUsize,
    pub list: AtomicUsize,
    pub update: AtomicUsize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.create.load(Ordering::SeqCst)
            + self.list.load(Ordering::SeqCst)
            + self.update.load(Ordering::SeqCst)
    }
}

/// In-memory store that records every call.
#[derive(Debug, Default)]
pub struct CountingStore {
    pub inner: InMemoryTaskStore,
    pub calls: CallCounts,
}

impl CountingStore {
    pub fn with_tasks(project: &ProjectId, tasks: Vec<Task>) -> Self {
        Self {
            inner: InMemoryTaskStore::with_tasks(project, tasks),
            calls: CallCounts::default(),
        }
    }
}

#[async_trait]
impl TaskStore for CountingStore {
    async fn create_task(&self, project: &ProjectId, task: &Task) -> StoreResult<Task> {
        self.calls.create.fetch_add(1, Ordering::SeqCst);
        self.inner.create_task(project, task).await
    }

    async fn list_tasks(&self, project: &ProjectId) -> StoreResult<Vec<Task>> {
        self.calls.list.fetch_add(1, Ordering::SeqCst);
        self.inner.list_tasks(project).await
    }

    async fn update_task_status(&self, id: TaskId, status: TaskStatus) -> StoreResult<Task> {
        self.calls.update.fetch_add(1, Ordering::SeqCst);
        self.inner.update_task_status(id, status).await
    }
}

/// Store whose every call takes `delay` before answering.
#[derive(Debug)]
pub struct SlowStore {
    pub delay: Duration,
    pub calls: CallCounts,
}

impl SlowStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            calls: CallCounts::default(),
        }
    }
}

#[async_trait]
impl TaskStore for SlowStore {
    async fn create_task(&self, _project: &ProjectId, task: &Task) -> StoreResult<Task> {
        self.calls.create.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(task.clone())
    }

    async fn list_tasks(&self, _project: &ProjectId) -> StoreResult<Vec<Task>> {
        self.calls.list.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(Vec::new())
    }

    async fn update_task_status(&self, id: TaskId, _status: TaskStatus) -> StoreResult<Task> {
        self.calls.update.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Err(StoreError::NotFound(id))
    }
}

/// In-memory store that rejects creates once `accept` have succeeded.
#[derive(Debug, Default)]
pub struct FlakyStore {
    pub inner: InMemoryTaskStore,
    pub accept: usize,
    pub calls: CallCounts,
}

impl FlakyStore {
    pub fn accepting(accept: usize) -> Self {
        Self {
            accept,
            ..Self::default()
        }
    }
}

#[async_trait]
impl TaskStore for FlakyStore {
    async fn create_task(&self, project: &ProjectId, task: &Task) -> StoreResult<Task> {
        let seen = self.calls.create.fetch_add(1, Ordering::SeqCst);
        if seen >= self.accept {
            return Err(StoreError::Transport("connection reset by peer".into()));
        }
        self.inner.create_task(project, task).await
    }

    async fn list_tasks(&self, project: &ProjectId) -> StoreResult<Vec<Task>> {
        self.calls.list.fetch_add(1, Ordering::SeqCst);
        self.inner.list_tasks(project).await
    }

    async fn update_task_status(&self, id: TaskId, status: TaskStatus) -> StoreResult<Task> {
        self.calls.update.fetch_add(1, Ordering::SeqCst);
        self.inner.update_task_status(id, status).await
    }
}
