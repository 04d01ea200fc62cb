//! Repository doubles for tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::Semaphore;

use super::{LocalTaskRepository, NewTask, Task, TaskId, TaskPatch, TaskRepository};
use crate::{Error, Result};

/// Local repository that can be told to fail or stall
pub struct FlakyRepository {
    inner: LocalTaskRepository,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    hold_writes: AtomicBool,
    reject_session: AtomicBool,
    gate: Semaphore,
    list_calls: AtomicUsize,
    _dir: TempDir,
}

impl FlakyRepository {
    pub async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let inner = LocalTaskRepository::open(dir.path().join("store.json"))
            .await
            .unwrap();
        Self {
            inner,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            hold_writes: AtomicBool::new(false),
            reject_session: AtomicBool::new(false),
            gate: Semaphore::new(0),
            list_calls: AtomicUsize::new(0),
            _dir: dir,
        }
    }

    pub fn fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, on: bool) {
        self.fail_writes.store(on, Ordering::SeqCst);
    }

    /// Answer writes as if the backend no longer accepts the session
    pub fn reject_session(&self, on: bool) {
        self.reject_session.store(on, Ordering::SeqCst);
    }

    /// Make writes wait until [`release_one`](Self::release_one) is called
    pub fn hold_writes(&self) {
        self.hold_writes.store(true, Ordering::SeqCst);
    }

    pub fn release_one(&self) {
        self.gate.add_permits(1);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    async fn before_write(&self) -> Result<()> {
        if self.hold_writes.load(Ordering::SeqCst) {
            let permit = self
                .gate
                .acquire()
                .await
                .map_err(|e| Error::Persistence(e.to_string()))?;
            permit.forget();
        }
        if self.reject_session.load(Ordering::SeqCst) {
            return Err(Error::Unauthenticated);
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Persistence("backend unreachable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for FlakyRepository {
    async fn list_where(&self, owner_id: &str) -> Result<Vec<Task>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::Persistence("backend unreachable".to_string()));
        }
        self.inner.list_where(owner_id).await
    }

    async fn get(&self, id: &str) -> Result<Option<Task>> {
        self.inner.get(id).await
    }

    async fn insert(&self, record: NewTask) -> Result<TaskId> {
        self.before_write().await?;
        self.inner.insert(record).await
    }

    async fn update_fields(&self, id: &str, patch: TaskPatch) -> Result<()> {
        self.before_write().await?;
        self.inner.update_fields(id, patch).await
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        self.before_write().await?;
        self.inner.delete(id).await
    }
}
