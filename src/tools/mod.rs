//! The tool façade and the data-service port it talks through.

pub mod facade;
pub mod file;
pub mod health;
pub mod memory;
pub mod schema;
pub mod store;

pub use facade::TaskAgent;
pub use file::FileTaskStore;
pub use health::{AgentAvailability, HealthStatus, ServiceHealth};
pub use memory::InMemoryTaskStore;
pub use schema::{tool_specs, SideEffects, ToolCall, ToolError, ToolOutput, ToolResult, ToolSpec};
pub use store::{StoreError, StoreResult, TaskStore};
