//! Task repository trait
//!
//! Defines the interface for task persistence backends.

use async_trait::async_trait;

use super::model::{NewTask, Task, TaskId, TaskPatch};
use crate::Result;

/// A queryable task collection keyed by owner identity
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// All tasks owned by `owner_id`, in retrieval order
    async fn list_where(&self, owner_id: &str) -> Result<Vec<Task>>;

    /// Get a task by ID
    async fn get(&self, id: &str) -> Result<Option<Task>>;

    /// Persist a new record and return its assigned ID
    async fn insert(&self, record: NewTask) -> Result<TaskId>;

    /// Apply a partial update to an existing task
    async fn update_fields(&self, id: &str, patch: TaskPatch) -> Result<()>;

    /// Delete a task by ID, returning whether it existed
    async fn delete(&self, id: &str) -> Result<bool>;
}
