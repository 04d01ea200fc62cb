//! Identity provider backed by the TaskFlow REST API

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use tokio::sync::watch;
use tracing::info;

use super::wire::{AccountResponse, CredentialsRequest, SessionResponse};
use super::ApiClient;
use crate::session::{AuthError, Identity, IdentityProvider};
use crate::Error;

pub struct HttpIdentityProvider {
    client: Arc<ApiClient>,
    session: watch::Sender<Option<Identity>>,
}

impl HttpIdentityProvider {
    pub fn new(client: Arc<ApiClient>) -> Self {
        let (session, _) = watch::channel(None);
        Self { client, session }
    }

    /// Resume a session from a previously issued token
    pub async fn resume(&self, token: &str) -> Result<Identity, AuthError> {
        self.client.set_token(token);
        let request = self.client.request(Method::GET, "/api/auth/me");
        let identity = match self.fetch::<AccountResponse>(request).await {
            Ok(account) => Identity::from(account),
            Err(err) => {
                self.client.clear_token();
                return Err(err);
            }
        };

        info!("Resumed session for {}", identity.email);
        self.session.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    async fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, AuthError> {
        let response = self.client.send(request).await.map_err(into_auth_error)?;
        self.client.json(response).await.map_err(into_auth_error)
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn create_account(&self, email: &str, secret: &str) -> Result<Identity, AuthError> {
        let request = self
            .client
            .request(Method::POST, "/api/auth/register")
            .json(&CredentialsRequest {
                email: email.to_string(),
                password: secret.to_string(),
            });
        let account: AccountResponse = self.fetch(request).await?;
        Ok(account.into())
    }

    async fn sign_in(&self, email: &str, secret: &str) -> Result<Identity, AuthError> {
        let request = self
            .client
            .request(Method::POST, "/api/auth/login")
            .json(&CredentialsRequest {
                email: email.to_string(),
                password: secret.to_string(),
            });
        let session: SessionResponse = self.fetch(request).await?;

        self.client.set_token(session.token);
        let identity = Identity {
            uid: session.uid,
            email: session.email,
        };
        self.session.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        // Tokens are stateless; forgetting it is the whole sign-out
        self.client.clear_token();
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

fn into_auth_error(err: Error) -> AuthError {
    match err {
        Error::Auth(auth) => auth,
        Error::Validation(msg) => AuthError::InvalidInput(msg),
        Error::Unauthenticated => AuthError::Backend("Session token rejected".to_string()),
        other => AuthError::Backend(other.to_string()),
    }
}
