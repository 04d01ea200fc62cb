//! In-memory task sequence mirrored to a repository
//!
//! Mutations reach the backend first and touch the in-memory sequence only
//! once the backend has acknowledged them, so a failed write never leaves the
//! two diverging.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::model::{Task, TaskDraft, TaskPatch};
use super::repository::TaskRepository;
use crate::{Error, Result};

/// In-flight key used for task creation
const ADD_KEY: &str = "add";

#[derive(Debug, Default)]
struct StoreState {
    owner: Option<String>,
    tasks: Vec<Task>,
    /// Set once the backend has answered for the current owner
    loaded: bool,
}

/// The signed-in user's tasks, in retrieval order
pub struct TaskStore {
    repo: Arc<dyn TaskRepository>,
    state: RwLock<StoreState>,
    in_flight: Mutex<HashSet<String>>,
}

impl TaskStore {
    pub fn new(repo: Arc<dyn TaskRepository>) -> Self {
        Self {
            repo,
            state: RwLock::new(StoreState::default()),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Replace the whole sequence with `owner_id`'s tasks from the backend
    pub async fn load(&self, owner_id: &str) -> Result<Vec<Task>> {
        {
            let mut state = self.state.write().await;
            if state.owner.as_deref() != Some(owner_id) {
                state.owner = Some(owner_id.to_string());
                state.tasks.clear();
            }
            state.loaded = false;
        }

        let tasks = self.repo.list_where(owner_id).await.inspect_err(|e| {
            warn!("Failed to load tasks for {}: {}", owner_id, e);
        })?;

        let mut state = self.state.write().await;
        if state.owner.as_deref() != Some(owner_id) {
            debug!("Session changed while loading tasks for {}; discarding", owner_id);
            return Ok(state.tasks.clone());
        }
        state.tasks = tasks;
        state.loaded = true;
        debug!("Loaded {} tasks for {}", state.tasks.len(), owner_id);
        Ok(state.tasks.clone())
    }

    /// Validate, persist and append a new task
    pub async fn add(&self, draft: TaskDraft) -> Result<Task> {
        let owner = self.require_owner().await?;
        let record = draft.into_new_task(owner.clone())?;
        let _guard = InFlight::begin(&self.in_flight, ADD_KEY)?;

        let id = self.repo.insert(record.clone()).await?;
        let task = record.with_id(id);

        let mut state = self.state.write().await;
        if state.owner.as_deref() == Some(owner.as_str()) {
            state.tasks.push(task.clone());
        }
        debug!("Added task {} for {}", task.id, owner);
        Ok(task)
    }

    /// Flip the completion flag of a task
    pub async fn toggle_complete(&self, id: &str) -> Result<Task> {
        self.require_owner().await?;
        let _guard = InFlight::begin(&self.in_flight, id)?;

        let current = self
            .get(id)
            .await
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        let patch = TaskPatch::completed(!current.completed);

        self.repo.update_fields(id, patch).await.inspect_err(|e| {
            warn!("Failed to update task {}: {}", id, e);
        })?;

        let mut state = self.state.write().await;
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        patch.apply(task);
        debug!("Task {} completed={}", id, task.completed);
        Ok(task.clone())
    }

    /// Delete a task from the backend and the sequence
    pub async fn remove(&self, id: &str) -> Result<Task> {
        self.require_owner().await?;
        let _guard = InFlight::begin(&self.in_flight, id)?;

        if self.get(id).await.is_none() {
            return Err(Error::TaskNotFound(id.to_string()));
        }

        let existed = self.repo.delete(id).await.inspect_err(|e| {
            warn!("Failed to delete task {}: {}", id, e);
        })?;
        if !existed {
            warn!("Task {} was already gone from the backend; dropping local copy", id);
        }

        let mut state = self.state.write().await;
        let index = state
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        debug!("Removed task {}", id);
        Ok(state.tasks.remove(index))
    }

    /// Forget the owner and every loaded task
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.owner = None;
        state.tasks.clear();
        state.loaded = false;
    }

    /// Whether the last load for the current owner succeeded
    pub async fn is_loaded(&self) -> bool {
        self.state.read().await.loaded
    }

    pub async fn get(&self, id: &str) -> Option<Task> {
        self.state
            .read()
            .await
            .tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    pub async fn snapshot(&self) -> Vec<Task> {
        self.state.read().await.tasks.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.tasks.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// The owner whose tasks are loaded, if any
    pub async fn owner(&self) -> Option<String> {
        self.state.read().await.owner.clone()
    }

    /// Whether a toggle or delete for `id` is waiting on the backend
    pub fn is_pending(&self, id: &str) -> bool {
        self.lock_in_flight().contains(id)
    }

    /// Whether a task creation is waiting on the backend
    pub fn is_adding(&self) -> bool {
        self.is_pending(ADD_KEY)
    }

    /// Ids of tasks with a request in flight
    pub fn pending(&self) -> HashSet<String> {
        self.lock_in_flight().clone()
    }

    async fn require_owner(&self) -> Result<String> {
        self.owner().await.ok_or(Error::Unauthenticated)
    }

    fn lock_in_flight(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Marks a request as in flight until dropped
struct InFlight<'a> {
    set: &'a Mutex<HashSet<String>>,
    key: String,
}

impl<'a> InFlight<'a> {
    fn begin(set: &'a Mutex<HashSet<String>>, key: &str) -> Result<Self> {
        let mut keys = set.lock().unwrap_or_else(|e| e.into_inner());
        if !keys.insert(key.to_string()) {
            return Err(Error::Busy(key.to_string()));
        }
        Ok(Self {
            set,
            key: key.to_string(),
        })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut keys = self.set.lock().unwrap_or_else(|e| e.into_inner());
        keys.remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::testing::FlakyRepository;
    use crate::task::TaskPriority;

    async fn signed_in_store() -> (Arc<TaskStore>, Arc<FlakyRepository>) {
        let repo = Arc::new(FlakyRepository::new().await);
        let store = Arc::new(TaskStore::new(repo.clone()));
        store.load("alice").await.unwrap();
        (store, repo)
    }

    #[tokio::test]
    async fn test_add_appends_open_task() {
        let (store, _repo) = signed_in_store().await;

        for (i, title) in ["Buy milk", "Walk dog", "Pay rent"].iter().enumerate() {
            let task = store.add(TaskDraft::new(*title)).await.unwrap();
            assert!(!task.completed);
            assert_eq!(task.owner_id, "alice");
            assert_eq!(store.len().await, i + 1);
        }

        let titles: Vec<String> = store.snapshot().await.into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["Buy milk", "Walk dog", "Pay rent"]);
    }

    #[tokio::test]
    async fn test_blank_title_leaves_sequence_unchanged() {
        let (store, _repo) = signed_in_store().await;
        store.add(TaskDraft::new("Existing")).await.unwrap();

        let result = store.add(TaskDraft::new("   ")).await;
        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_mutations_require_session() {
        let repo = Arc::new(FlakyRepository::new().await);
        let store = TaskStore::new(repo);

        assert!(matches!(
            store.add(TaskDraft::new("Buy milk")).await,
            Err(Error::Unauthenticated)
        ));
        assert!(matches!(
            store.toggle_complete("x").await,
            Err(Error::Unauthenticated)
        ));
        assert!(matches!(store.remove("x").await, Err(Error::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_double_toggle_restores_state() {
        let (store, repo) = signed_in_store().await;
        let task = store.add(TaskDraft::new("Buy milk")).await.unwrap();

        let once = store.toggle_complete(&task.id).await.unwrap();
        assert!(once.completed);
        assert!(repo.get(&task.id).await.unwrap().unwrap().completed);

        let twice = store.toggle_complete(&task.id).await.unwrap();
        assert!(!twice.completed);
        assert!(!store.get(&task.id).await.unwrap().completed);
    }

    #[tokio::test]
    async fn test_failed_toggle_keeps_local_state() {
        let (store, repo) = signed_in_store().await;
        let task = store.add(TaskDraft::new("Buy milk")).await.unwrap();

        repo.fail_writes(true);
        let result = store.toggle_complete(&task.id).await;

        assert!(matches!(result, Err(Error::Persistence(_))));
        assert!(!store.get(&task.id).await.unwrap().completed);
        assert!(!store.is_pending(&task.id));
    }

    #[tokio::test]
    async fn test_remove_deletes_exactly_one() {
        let (store, repo) = signed_in_store().await;
        let keep = store.add(TaskDraft::new("Keep")).await.unwrap();
        let drop = store.add(TaskDraft::new("Drop")).await.unwrap();

        let removed = store.remove(&drop.id).await.unwrap();
        assert_eq!(removed.id, drop.id);

        let remaining = store.snapshot().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, keep.id);
        assert!(repo.get(&drop.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_unknown_task_reports_not_found() {
        let (store, _repo) = signed_in_store().await;
        store.add(TaskDraft::new("Keep")).await.unwrap();

        assert!(matches!(
            store.remove("missing").await,
            Err(Error::TaskNotFound(_))
        ));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_failed_remove_keeps_task() {
        let (store, repo) = signed_in_store().await;
        let task = store.add(TaskDraft::new("Keep")).await.unwrap();

        repo.fail_writes(true);
        assert!(store.remove(&task.id).await.is_err());
        assert!(store.get(&task.id).await.is_some());
    }

    #[tokio::test]
    async fn test_failed_add_appends_nothing() {
        let (store, repo) = signed_in_store().await;

        repo.fail_writes(true);
        assert!(store.add(TaskDraft::new("Lost")).await.is_err());
        assert!(store.is_empty().await);
        assert!(!store.is_adding());
    }

    #[tokio::test]
    async fn test_load_replaces_sequence_per_owner() {
        let (store, _repo) = signed_in_store().await;
        store
            .add(TaskDraft::new("Alice task").with_priority(TaskPriority::High))
            .await
            .unwrap();

        let bob_tasks = store.load("bob").await.unwrap();
        assert!(bob_tasks.is_empty());
        assert!(store.is_empty().await);
        store.add(TaskDraft::new("Bob task")).await.unwrap();

        let alice_tasks = store.load("alice").await.unwrap();
        assert_eq!(alice_tasks.len(), 1);
        assert_eq!(alice_tasks[0].title, "Alice task");
        assert_eq!(store.snapshot().await, alice_tasks);
    }

    #[tokio::test]
    async fn test_failed_load_reports_error() {
        let (store, repo) = signed_in_store().await;
        repo.fail_reads(true);

        assert!(matches!(
            store.load("bob").await,
            Err(Error::Persistence(_))
        ));
        assert_eq!(store.owner().await.as_deref(), Some("bob"));
        assert!(store.is_empty().await);
        assert!(!store.is_loaded().await);

        repo.fail_reads(false);
        store.load("bob").await.unwrap();
        assert!(store.is_loaded().await);
    }

    #[tokio::test]
    async fn test_clear_forgets_session() {
        let (store, _repo) = signed_in_store().await;
        store.add(TaskDraft::new("Buy milk")).await.unwrap();

        store.clear().await;

        assert!(store.is_empty().await);
        assert!(store.owner().await.is_none());
        assert!(!store.is_loaded().await);
    }

    #[tokio::test]
    async fn test_concurrent_toggle_is_rejected() {
        let (store, repo) = signed_in_store().await;
        let task = store.add(TaskDraft::new("Buy milk")).await.unwrap();

        repo.hold_writes();
        let first = tokio::spawn({
            let store = Arc::clone(&store);
            let id = task.id.clone();
            async move { store.toggle_complete(&id).await }
        });

        while !store.is_pending(&task.id) {
            tokio::task::yield_now().await;
        }
        assert!(matches!(
            store.toggle_complete(&task.id).await,
            Err(Error::Busy(_))
        ));

        repo.release_one();
        let toggled = first.await.unwrap().unwrap();
        assert!(toggled.completed);
        assert!(!store.is_pending(&task.id));
    }

    #[tokio::test]
    async fn test_concurrent_add_is_rejected() {
        let (store, repo) = signed_in_store().await;

        repo.hold_writes();
        let first = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.add(TaskDraft::new("Buy milk")).await }
        });

        while !store.is_adding() {
            tokio::task::yield_now().await;
        }
        assert!(matches!(
            store.add(TaskDraft::new("Walk dog")).await,
            Err(Error::Busy(_))
        ));

        repo.release_one();
        let added = first.await.unwrap().unwrap();
        assert_eq!(added.title, "Buy milk");
        assert_eq!(store.len().await, 1);
        assert!(!store.is_adding());
    }

    #[tokio::test]
    async fn test_concurrent_remove_is_rejected() {
        let (store, repo) = signed_in_store().await;
        let task = store.add(TaskDraft::new("Buy milk")).await.unwrap();

        repo.hold_writes();
        let first = tokio::spawn({
            let store = Arc::clone(&store);
            let id = task.id.clone();
            async move { store.remove(&id).await }
        });

        while !store.is_pending(&task.id) {
            tokio::task::yield_now().await;
        }
        assert!(matches!(
            store.remove(&task.id).await,
            Err(Error::Busy(_))
        ));
        assert!(matches!(
            store.toggle_complete(&task.id).await,
            Err(Error::Busy(_))
        ));

        repo.release_one();
        let removed = first.await.unwrap().unwrap();
        assert_eq!(removed.id, task.id);
        assert!(store.is_empty().await);
        assert!(!store.is_pending(&task.id));
    }
}
