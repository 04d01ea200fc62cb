//! Local task storage implementation
//!
//! Keeps every user's tasks as one serialized sequence under the `tasks` key
//! of a [`LocalStorage`] file, in insertion order.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::model::{NewTask, Task, TaskId, TaskPatch};
use super::repository::TaskRepository;
use crate::storage::LocalStorage;
use crate::{Error, Result};

const TASKS_KEY: &str = "tasks";

/// Task repository over local key-value storage
#[derive(Clone)]
pub struct LocalTaskRepository {
    storage: Arc<LocalStorage>,
}

impl LocalTaskRepository {
    pub fn new(storage: Arc<LocalStorage>) -> Self {
        Self { storage }
    }

    /// Open a repository with its own storage file
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::new(Arc::new(LocalStorage::open(path).await?)))
    }

    async fn all(&self) -> Result<Vec<Task>> {
        Ok(self
            .storage
            .get::<Vec<Task>>(TASKS_KEY)
            .await?
            .unwrap_or_default())
    }
}

#[async_trait]
impl TaskRepository for LocalTaskRepository {
    async fn list_where(&self, owner_id: &str) -> Result<Vec<Task>> {
        let mut tasks = self.all().await?;
        tasks.retain(|t| t.owner_id == owner_id);
        Ok(tasks)
    }

    async fn get(&self, id: &str) -> Result<Option<Task>> {
        Ok(self.all().await?.into_iter().find(|t| t.id == id))
    }

    async fn insert(&self, record: NewTask) -> Result<TaskId> {
        let id = Uuid::new_v4().to_string();
        let task = record.with_id(id.clone());
        self.storage
            .update(TASKS_KEY, |tasks: &mut Vec<Task>| {
                tasks.push(task);
                Ok(())
            })
            .await?;
        Ok(id)
    }

    async fn update_fields(&self, id: &str, patch: TaskPatch) -> Result<()> {
        self.storage
            .update(TASKS_KEY, |tasks: &mut Vec<Task>| {
                let task = tasks
                    .iter_mut()
                    .find(|t| t.id == id)
                    .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
                patch.apply(task);
                Ok(())
            })
            .await
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        if self.get(id).await?.is_none() {
            return Ok(false);
        }
        self.storage
            .update(TASKS_KEY, |tasks: &mut Vec<Task>| {
                let before = tasks.len();
                tasks.retain(|t| t.id != id);
                Ok(tasks.len() != before)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{TaskDraft, TaskPriority};
    use tempfile::TempDir;

    async fn create_test_repo() -> (LocalTaskRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let repo = LocalTaskRepository::open(temp_dir.path().join("store.json"))
            .await
            .unwrap();
        (repo, temp_dir)
    }

    fn record(title: &str, owner: &str) -> NewTask {
        TaskDraft::new(title).into_new_task(owner).unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_unique_ids() {
        let (repo, _temp) = create_test_repo().await;

        let first = repo.insert(record("Task 1", "alice")).await.unwrap();
        let second = repo.insert(record("Task 2", "alice")).await.unwrap();
        assert_ne!(first, second);

        let stored = repo.get(&first).await.unwrap().unwrap();
        assert_eq!(stored.title, "Task 1");
        assert_eq!(stored.owner_id, "alice");
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_ordered() {
        let (repo, _temp) = create_test_repo().await;

        repo.insert(record("A1", "alice")).await.unwrap();
        repo.insert(record("B1", "bob")).await.unwrap();
        repo.insert(record("A2", "alice")).await.unwrap();

        let titles: Vec<String> = repo
            .list_where("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["A1", "A2"]);
        assert_eq!(repo.list_where("bob").await.unwrap().len(), 1);
        assert!(repo.list_where("carol").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_fields() {
        let (repo, _temp) = create_test_repo().await;
        let id = repo.insert(record("Task", "alice")).await.unwrap();

        repo.update_fields(&id, TaskPatch::completed(true))
            .await
            .unwrap();
        assert!(repo.get(&id).await.unwrap().unwrap().completed);

        match repo.update_fields("missing", TaskPatch::completed(true)).await {
            Err(Error::TaskNotFound(_)) => {}
            other => panic!("Expected TaskNotFound error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_task() {
        let (repo, _temp) = create_test_repo().await;
        let keep = repo.insert(record("Keep", "alice")).await.unwrap();
        let id = repo.insert(record("Drop", "alice")).await.unwrap();

        assert!(repo.delete(&id).await.unwrap());
        assert!(repo.get(&id).await.unwrap().is_none());
        assert!(repo.get(&keep).await.unwrap().is_some());

        // Delete again should return false
        assert!(!repo.delete(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_insert_leaves_no_task_behind() {
        let temp_dir = TempDir::new().unwrap();
        let repo = LocalTaskRepository::open(temp_dir.path().join("sub/store.json"))
            .await
            .unwrap();
        tokio::fs::write(temp_dir.path().join("sub"), "").await.unwrap();

        match repo.insert(record("Lost", "alice")).await {
            Err(Error::Persistence(_)) => {}
            other => panic!("Expected Persistence error, got: {:?}", other),
        }
        assert!(repo.list_where("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persistence_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.json");

        let id = {
            let repo = LocalTaskRepository::open(&path).await.unwrap();
            let draft = TaskDraft::new("Persistent task").with_priority(TaskPriority::High);
            repo.insert(draft.into_new_task("alice").unwrap())
                .await
                .unwrap()
        };

        let repo = LocalTaskRepository::open(&path).await.unwrap();
        let task = repo.get(&id).await.unwrap().unwrap();
        assert_eq!(task.title, "Persistent task");
        assert_eq!(task.priority, Some(TaskPriority::High));
    }
}
