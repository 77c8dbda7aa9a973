//! JSON-file data service used by the CLI.
//!
//! The whole file is read for every operation and rewritten through a
//! temporary file and rename on every write.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::core::{ProjectId, Task, TaskId, TaskStatus};
use crate::tools::store::{StoreError, StoreResult, TaskStore};

#[derive(Debug, Default, Serialize, Deserialize)]
struct TaskFile {
    #[serde(default)]
    projects: BTreeMap<ProjectId, Vec<Task>>,
}

/// Task store persisted to a single JSON file.
#[derive(Debug)]
pub struct FileTaskStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileTaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> StoreResult<TaskFile> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(TaskFile::default()),
            Ok(content) => serde_json::from_str(&content).map_err(StoreError::persistence),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(TaskFile::default()),
            Err(e) => Err(StoreError::persistence(e)),
        }
    }

    async fn write(&self, file: &TaskFile) -> StoreResult<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                tokio::fs::create_dir_all(dir)
                    .await
                    .map_err(StoreError::persistence)?;
            }
        }
        let json = serde_json::to_string_pretty(file).map_err(StoreError::persistence)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(StoreError::persistence)?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(StoreError::persistence)?;
        tracing::trace!(path = %self.path.display(), "task file written");
        Ok(())
    }
}

#[async_trait]
impl TaskStore for FileTaskStore {
    async fn create_task(&self, project: &ProjectId, task: &Task) -> StoreResult<Task> {
        let _guard = self.write_lock.lock().await;
        let mut file = self.read().await?;
        if file
            .projects
            .values()
            .flatten()
            .any(|existing| existing.id == task.id)
        {
            return Err(StoreError::Duplicate(task.id));
        }
        file.projects
            .entry(project.clone())
            .or_default()
            .push(task.clone());
        self.write(&file).await?;
        Ok(task.clone())
    }

    async fn list_tasks(&self, project: &ProjectId) -> StoreResult<Vec<Task>> {
        let file = self.read().await?;
        Ok(file.projects.get(project).cloned().unwrap_or_default())
    }

    async fn update_task_status(&self, id: TaskId, status: TaskStatus) -> StoreResult<Task> {
        let _guard = self.write_lock.lock().await;
        let mut file = self.read().await?;
        let updated = file
            .projects
            .values_mut()
            .flatten()
            .find(|t| t.id == id)
            .map(|t| {
                t.status = status;
                t.clone()
            })
            .ok_or(StoreError::NotFound(id))?;
        self.write(&file).await?;
        Ok(updated)
    }
}
