//! Application root
//!
//! Owns the session gate, the task store, the active filter and the transient
//! notice, and exposes one method per user action. A UI holds a
//! [`TaskFlowApp`] and redraws from [`TaskFlowApp::screen`] after each call.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::filter::TaskFilter;
use crate::session::{Identity, IdentityProvider, SessionGate, Transition};
use crate::task::{Task, TaskDraft, TaskRepository, TaskStore};
use crate::view::{render_task_list, TaskListView};
use crate::{Error, ErrorKind, Result};

/// How long a success notice stays visible
pub const SUCCESS_NOTICE_TTL_SECS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A banner shown above the current screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Which form the auth screen shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Combined register/login form
    #[default]
    Register,
    /// Login form shown after a successful registration
    Login,
}

/// The top-level screen to display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Auth {
        mode: AuthMode,
        notice: Option<Notice>,
        loading: bool,
    },
    Main {
        identity: Identity,
        view: TaskListView,
        notice: Option<Notice>,
        loading: bool,
    },
}

impl Screen {
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    pub fn notice(&self) -> Option<&Notice> {
        match self {
            Self::Auth { notice, .. } | Self::Main { notice, .. } => notice.as_ref(),
        }
    }
}

struct ActiveNotice {
    notice: Notice,
    expires_at: Option<DateTime<Utc>>,
}

pub struct TaskFlowApp {
    gate: SessionGate,
    store: TaskStore,
    clock: Arc<dyn Clock>,
    filter: RwLock<TaskFilter>,
    auth_mode: RwLock<AuthMode>,
    notice: Mutex<Option<ActiveNotice>>,
    loading: AtomicUsize,
    // Serializes session transitions so a login never loads twice
    transition: tokio::sync::Mutex<()>,
}

impl TaskFlowApp {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        repo: Arc<dyn TaskRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            gate: SessionGate::new(provider),
            store: TaskStore::new(repo),
            clock,
            filter: RwLock::new(TaskFilter::default()),
            auth_mode: RwLock::new(AuthMode::default()),
            notice: Mutex::new(None),
            loading: AtomicUsize::new(0),
            transition: tokio::sync::Mutex::new(()),
        }
    }

    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Resume whatever session the provider already holds
    pub async fn restore(&self) -> Result<Transition> {
        self.handle_session_change(self.gate.provider_session())
            .await
    }

    /// Drive the gate and the store from a session-change notification
    pub async fn handle_session_change(&self, identity: Option<Identity>) -> Result<Transition> {
        let _serial = self.transition.lock().await;
        let transition = self.gate.apply(identity.clone()).await;
        self.sync_store(identity.as_ref(), false).await?;
        Ok(transition)
    }

    /// Follow the provider's session notifications until the app is dropped
    pub fn spawn_session_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let app = Arc::downgrade(self);
        let mut changes = self.gate.subscribe();
        tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let identity = changes.borrow_and_update().clone();
                let Some(app) = app.upgrade() else {
                    break;
                };
                if let Err(err) = app.handle_session_change(identity).await {
                    warn!("Failed to apply session change: {}", err);
                }
            }
            debug!("Session listener stopped");
        })
    }

    pub async fn register(&self, email: &str, secret: &str) -> Result<Identity> {
        let _loading = self.begin_loading();
        match self.gate.register(email, secret).await {
            Ok(identity) => {
                *self.auth_mode.write().await = AuthMode::Login;
                self.set_notice(Notice::success("🎉 Registered successfully! Now login."));
                Ok(identity)
            }
            Err(err) => {
                let err = Error::from(err);
                self.report("Registration failed", &err);
                Err(err)
            }
        }
    }

    /// Sign in and load the user's tasks
    ///
    /// Always fetches from the backend, even when the same user is already
    /// signed in. A failed task load after a successful sign-in is reported as
    /// a notice; the session still starts.
    pub async fn login(&self, email: &str, secret: &str) -> Result<Identity> {
        let _loading = self.begin_loading();
        let _serial = self.transition.lock().await;

        let identity = match self.gate.login(email, secret).await {
            Ok(identity) => identity,
            Err(err) => {
                let err = Error::from(err);
                self.report("Login failed", &err);
                return Err(err);
            }
        };

        if self.sync_store(Some(&identity), true).await.is_ok() {
            self.set_notice(Notice::success("🎉 Successfully logged in!"));
        }
        Ok(identity)
    }

    pub async fn logout(&self) -> Result<()> {
        let _loading = self.begin_loading();
        let _serial = self.transition.lock().await;

        let result = self.gate.logout().await;
        self.sync_store(None, false).await?;
        result.map_err(|err| {
            let err = Error::from(err);
            self.report("Logout failed", &err);
            err
        })
    }

    pub async fn add_task(&self, draft: TaskDraft) -> Result<Task> {
        let _loading = self.begin_loading();
        match self.store.add(draft).await {
            Ok(task) => {
                self.set_notice(Notice::success("🎉 Task added successfully!"));
                Ok(task)
            }
            Err(err) => {
                self.report_task_error("Task creation failed", &err).await;
                Err(err)
            }
        }
    }

    pub async fn toggle_task(&self, id: &str) -> Result<Task> {
        let _loading = self.begin_loading();
        match self.store.toggle_complete(id).await {
            Ok(task) => {
                let state = if task.completed { "completed" } else { "incomplete" };
                self.set_notice(Notice::success(format!("✅ Task marked as {}", state)));
                Ok(task)
            }
            Err(err) => {
                self.report_task_error("Task update failed", &err).await;
                Err(err)
            }
        }
    }

    pub async fn delete_task(&self, id: &str) -> Result<Task> {
        let _loading = self.begin_loading();
        match self.store.remove(id).await {
            Ok(task) => {
                self.set_notice(Notice::success("🎉 Task deleted successfully!"));
                Ok(task)
            }
            Err(err) => {
                self.report_task_error("Task deletion failed", &err).await;
                Err(err)
            }
        }
    }

    pub async fn set_filter(&self, filter: TaskFilter) {
        *self.filter.write().await = filter;
    }

    pub async fn filter(&self) -> TaskFilter {
        *self.filter.read().await
    }

    /// Render the task list for the active filter
    pub async fn view(&self) -> TaskListView {
        let tasks = self.store.snapshot().await;
        render_task_list(
            &tasks,
            self.filter().await,
            self.clock.today(),
            &self.store.pending(),
        )
    }

    pub async fn screen(&self) -> Screen {
        let notice = self.notice();
        let loading = self.is_loading();
        match self.gate.identity().await {
            None => Screen::Auth {
                mode: *self.auth_mode.read().await,
                notice,
                loading,
            },
            Some(identity) => Screen::Main {
                identity,
                view: self.view().await,
                notice,
                loading,
            },
        }
    }

    /// The current notice, dropping a success notice once it has expired
    pub fn notice(&self) -> Option<Notice> {
        let mut slot = self.notice.lock().unwrap_or_else(|e| e.into_inner());
        let expired = slot
            .as_ref()
            .and_then(|active| active.expires_at)
            .is_some_and(|expires_at| expires_at <= self.clock.now());
        if expired {
            *slot = None;
        }
        slot.as_ref().map(|active| active.notice.clone())
    }

    pub fn dismiss_notice(&self) {
        *self.notice.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst) > 0
    }

    /// Bring the store in line with `identity`
    ///
    /// Loads when the owner changes, when the last load for this owner failed,
    /// or when `force` is set.
    async fn sync_store(&self, identity: Option<&Identity>, force: bool) -> Result<()> {
        let owner = self.store.owner().await;
        match identity {
            Some(identity)
                if force
                    || owner.as_deref() != Some(identity.uid.as_str())
                    || !self.store.is_loaded().await =>
            {
                let _loading = self.begin_loading();
                if let Err(err) = self.store.load(&identity.uid).await {
                    self.set_notice(Notice::error(format!("❌ Error fetching tasks: {}", err)));
                    return Err(err);
                }
            }
            None if owner.is_some() => {
                self.store.clear().await;
                *self.auth_mode.write().await = AuthMode::Register;
            }
            _ => {}
        }
        Ok(())
    }

    fn set_notice(&self, notice: Notice) {
        let expires_at = match notice.level {
            NoticeLevel::Success => {
                Some(self.clock.now() + Duration::seconds(SUCCESS_NOTICE_TTL_SECS))
            }
            NoticeLevel::Error => None,
        };
        *self.notice.lock().unwrap_or_else(|e| e.into_inner()) =
            Some(ActiveNotice { notice, expires_at });
    }

    /// Report a failed task operation, ending the session if the backend
    /// refused it
    async fn report_task_error(&self, action: &str, err: &Error) {
        if err.kind() == ErrorKind::Unauthenticated && self.gate.state().await.is_authenticated() {
            warn!("Backend rejected the session during '{}'; signing out", action);
            let _serial = self.transition.lock().await;
            // The gate logs provider failures and goes Anonymous regardless
            let _ = self.gate.logout().await;
            if let Err(err) = self.sync_store(None, false).await {
                warn!("Failed to reset tasks after session rejection: {}", err);
            }
        }
        self.report(action, err);
    }

    fn report(&self, action: &str, err: &Error) {
        let message = match err.kind() {
            ErrorKind::Validation => format!("❗ {}", err),
            ErrorKind::Unauthenticated => "❗ User not authenticated!".to_string(),
            _ => format!("❌ {}: {}", action, err),
        };
        self.set_notice(Notice::error(message));
    }

    fn begin_loading(&self) -> LoadingGuard<'_> {
        self.loading.fetch_add(1, Ordering::SeqCst);
        LoadingGuard(&self.loading)
    }
}

struct LoadingGuard<'a>(&'a AtomicUsize);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
