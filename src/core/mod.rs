//! Core domain models.
//!
//! Tasks, their identifiers and enumerations, project domains, and the
//! dependency graph used to reason about blocking and ordering.

pub mod dag;
pub mod domain;
pub mod task;

pub use dag::{check_references, DanglingDependency, DependencyGraph};
pub use domain::Domain;
pub use task::{AssigneeType, Effort, ProjectId, Task, TaskId, TaskStatus};
