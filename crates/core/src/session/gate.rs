//! Session state machine
//!
//! Anonymous ⇄ Authenticated, driven either by explicit login/logout or by
//! the provider's session-change notifications. Both paths go through
//! [`SessionGate::apply`], which is idempotent.

use std::sync::Arc;

use tokio::sync::{watch, RwLock};
use tracing::{info, warn};

use super::credentials::{normalize_email, require_secret, validate_new_secret};
use super::{AuthError, Identity, IdentityProvider, SessionState, Transition};

pub struct SessionGate {
    provider: Arc<dyn IdentityProvider>,
    state: RwLock<SessionState>,
}

impl SessionGate {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            provider,
            state: RwLock::new(SessionState::Anonymous),
        }
    }

    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.state.read().await.identity().cloned()
    }

    /// Create a credential without signing in
    pub async fn register(&self, email: &str, secret: &str) -> Result<Identity, AuthError> {
        normalize_email(email)?;
        validate_new_secret(secret)?;

        let identity = self.provider.create_account(email, secret).await?;
        info!("Registered {}", identity.email);
        Ok(identity)
    }

    /// Sign in and move to Authenticated
    ///
    /// On failure the gate stays where it was.
    pub async fn login(&self, email: &str, secret: &str) -> Result<Identity, AuthError> {
        normalize_email(email)?;
        require_secret(secret)?;

        let identity = self.provider.sign_in(email, secret).await?;
        self.apply(Some(identity.clone())).await;
        Ok(identity)
    }

    /// Sign out and move to Anonymous
    ///
    /// The local transition happens even if the provider call fails; the
    /// provider error is still returned.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let result = self.provider.sign_out().await;
        if let Err(err) = &result {
            warn!("Sign-out failed at the provider: {}", err);
        }
        self.apply(None).await;
        result
    }

    /// Apply a session-change notification
    pub async fn apply(&self, identity: Option<Identity>) -> Transition {
        let mut state = self.state.write().await;
        let current = state.identity().cloned();
        match (identity, current) {
            (Some(next), Some(current)) if current == next => Transition::Unchanged,
            (Some(next), _) => {
                info!("Session started for {}", next.email);
                *state = SessionState::Authenticated(next.clone());
                Transition::SignedIn(next)
            }
            (None, None) => Transition::Unchanged,
            (None, Some(current)) => {
                info!("Session ended for {}", current.email);
                *state = SessionState::Anonymous;
                Transition::SignedOut
            }
        }
    }

    /// The provider's current session, used to resume after a restart
    pub fn provider_session(&self) -> Option<Identity> {
        self.provider.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.provider.subscribe()
    }
}
