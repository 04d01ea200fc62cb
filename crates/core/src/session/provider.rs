//! Identity provider seam

use async_trait::async_trait;
use tokio::sync::watch;

use super::{AuthError, Identity};

/// An external identity service
///
/// Creating an account never signs the user in; callers log in explicitly.
/// Every sign-in and sign-out is published on the [`subscribe`] channel.
///
/// [`subscribe`]: IdentityProvider::subscribe
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_account(&self, email: &str, secret: &str) -> Result<Identity, AuthError>;

    async fn sign_in(&self, email: &str, secret: &str) -> Result<Identity, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// The session the provider currently holds, possibly restored at start-up
    fn current(&self) -> Option<Identity>;

    /// Session-change notifications
    fn subscribe(&self) -> watch::Receiver<Option<Identity>>;
}
