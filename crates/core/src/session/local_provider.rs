//! Identity provider over local storage
//!
//! Accounts live under `users`; the signed-in identity is remembered under
//! `currentUser` so a restart resumes the session.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::info;

use super::accounts::AccountBook;
use super::{AuthError, Identity, IdentityProvider};
use crate::storage::LocalStorage;

const CURRENT_USER_KEY: &str = "currentUser";

pub struct LocalIdentityProvider {
    accounts: AccountBook,
    storage: Arc<LocalStorage>,
    session: watch::Sender<Option<Identity>>,
}

impl LocalIdentityProvider {
    pub async fn new(storage: Arc<LocalStorage>) -> Result<Self, AuthError> {
        let restored: Option<Identity> = storage
            .get(CURRENT_USER_KEY)
            .await
            .map_err(|e| AuthError::Backend(e.to_string()))?;
        if let Some(identity) = &restored {
            info!("Restored session for {}", identity.email);
        }

        let (session, _) = watch::channel(restored);
        Ok(Self {
            accounts: AccountBook::new(Arc::clone(&storage)),
            storage,
            session,
        })
    }

    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AuthError> {
        let storage = LocalStorage::open(path)
            .await
            .map_err(|e| AuthError::Backend(e.to_string()))?;
        Self::new(Arc::new(storage)).await
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn create_account(&self, email: &str, secret: &str) -> Result<Identity, AuthError> {
        self.accounts.create(email, secret).await
    }

    async fn sign_in(&self, email: &str, secret: &str) -> Result<Identity, AuthError> {
        let identity = self.accounts.verify(email, secret).await?;
        self.storage
            .set(CURRENT_USER_KEY, &identity)
            .await
            .map_err(|e| AuthError::Backend(e.to_string()))?;
        self.session.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.storage
            .remove_item(CURRENT_USER_KEY)
            .await
            .map_err(|e| AuthError::Backend(e.to_string()))?;
        self.session.send_replace(None);
        Ok(())
    }

    fn current(&self) -> Option<Identity> {
        self.session.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.session.subscribe()
    }
}
