//! Application state

use std::path::{Path, PathBuf};
use std::sync::Arc;

use taskflow_core::session::AccountBook;
use taskflow_core::storage::LocalStorage;
use taskflow_core::task::LocalTaskRepository;

use crate::auth::TokenIssuer;
use crate::config::ServerConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    data_dir: PathBuf,
    tasks: LocalTaskRepository,
    accounts: AccountBook,
    tokens: TokenIssuer,
}

impl AppState {
    /// Open the store under the configured data directory
    pub async fn new(config: &ServerConfig) -> taskflow_core::Result<Self> {
        let storage = Arc::new(LocalStorage::open(config.data_dir.join("store.json")).await?);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                data_dir: config.data_dir.clone(),
                tasks: LocalTaskRepository::new(Arc::clone(&storage)),
                accounts: AccountBook::new(storage),
                tokens: TokenIssuer::new(&config.jwt_secret, config.token_ttl),
            }),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.inner.data_dir
    }

    pub fn tasks(&self) -> &LocalTaskRepository {
        &self.inner.tasks
    }

    pub fn accounts(&self) -> &AccountBook {
        &self.inner.accounts
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.inner.tokens
    }
}
