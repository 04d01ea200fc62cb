//! Registered accounts kept in local storage

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::credentials::{
    hash_secret, normalize_email, require_secret, validate_new_secret, verify_secret,
};
use super::{AuthError, Identity};
use crate::storage::LocalStorage;
use crate::Error;

const USERS_KEY: &str = "users";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Account {
    uid: String,
    email: String,
    secret_hash: String,
    created_at: DateTime<Utc>,
}

impl Account {
    fn identity(&self) -> Identity {
        Identity {
            uid: self.uid.clone(),
            email: self.email.clone(),
        }
    }
}

/// The list of registered accounts under the `users` key
#[derive(Clone)]
pub struct AccountBook {
    storage: Arc<LocalStorage>,
}

impl AccountBook {
    pub fn new(storage: Arc<LocalStorage>) -> Self {
        Self { storage }
    }

    /// Register a new account; fails with `Conflict` if the email is taken
    pub async fn create(&self, email: &str, secret: &str) -> Result<Identity, AuthError> {
        let email = normalize_email(email)?;
        validate_new_secret(secret)?;

        let account = Account {
            uid: Uuid::new_v4().to_string(),
            email,
            secret_hash: hash_secret(secret),
            created_at: Utc::now(),
        };
        let identity = account.identity();

        self.storage
            .update(USERS_KEY, |accounts: &mut Vec<Account>| {
                if accounts.iter().any(|a| a.email == account.email) {
                    return Err(Error::Auth(AuthError::Conflict(format!(
                        "User '{}' already exists",
                        account.email
                    ))));
                }
                accounts.push(account);
                Ok(())
            })
            .await
            .map_err(into_auth_error)?;

        Ok(identity)
    }

    /// Check credentials, telling an unknown email apart from a wrong secret
    pub async fn verify(&self, email: &str, secret: &str) -> Result<Identity, AuthError> {
        let email = normalize_email(email)?;
        require_secret(secret)?;

        let account = self
            .accounts()
            .await?
            .into_iter()
            .find(|a| a.email == email)
            .ok_or(AuthError::UnknownIdentity(email))?;

        if !verify_secret(&account.secret_hash, secret) {
            return Err(AuthError::WrongSecret);
        }
        Ok(account.identity())
    }

    pub async fn find_by_uid(&self, uid: &str) -> Result<Option<Identity>, AuthError> {
        Ok(self
            .accounts()
            .await?
            .iter()
            .find(|a| a.uid == uid)
            .map(Account::identity))
    }

    async fn accounts(&self) -> Result<Vec<Account>, AuthError> {
        Ok(self
            .storage
            .get::<Vec<Account>>(USERS_KEY)
            .await
            .map_err(into_auth_error)?
            .unwrap_or_default())
    }
}

fn into_auth_error(err: Error) -> AuthError {
    match err {
        Error::Auth(auth) => auth,
        other => AuthError::Backend(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn build_book() -> (AccountBook, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::open(temp_dir.path().join("store.json"))
            .await
            .unwrap();
        (AccountBook::new(Arc::new(storage)), temp_dir)
    }

    #[tokio::test]
    async fn test_register_and_verify() {
        let (book, _temp) = build_book().await;

        let created = book.create("A@Example.com", "secret1").await.unwrap();
        assert_eq!(created.email, "a@example.com");

        let verified = book.verify("a@example.com", "secret1").await.unwrap();
        assert_eq!(verified, created);
        assert_eq!(
            book.find_by_uid(&created.uid).await.unwrap(),
            Some(created)
        );
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let (book, _temp) = build_book().await;
        book.create("a@example.com", "secret1").await.unwrap();

        match book.create(" a@example.com", "another1").await {
            Err(AuthError::Conflict(msg)) => assert!(msg.contains("already exists")),
            other => panic!("Expected Conflict error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_verify_distinguishes_failures() {
        let (book, _temp) = build_book().await;
        book.create("a@example.com", "secret1").await.unwrap();

        assert!(matches!(
            book.verify("b@example.com", "secret1").await,
            Err(AuthError::UnknownIdentity(_))
        ));
        assert!(matches!(
            book.verify("a@example.com", "wrong-secret").await,
            Err(AuthError::WrongSecret)
        ));
        assert!(matches!(
            book.verify("a@example.com", "").await,
            Err(AuthError::InvalidInput(_))
        ));
    }
}
