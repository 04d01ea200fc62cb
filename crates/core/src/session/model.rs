use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ErrorKind;

/// An authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub uid: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated(Identity),
}

impl SessionState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(identity) => Some(identity),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Outcome of applying a session-change notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    SignedIn(Identity),
    SignedOut,
    Unchanged,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("no account for {0}")]
    UnknownIdentity(String),
    #[error("wrong password")]
    WrongSecret,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("auth backend error: {0}")]
    Backend(String),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::Validation,
            Self::UnknownIdentity(_) => ErrorKind::UnknownIdentity,
            Self::WrongSecret => ErrorKind::WrongSecret,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Backend(_) => ErrorKind::Backend,
        }
    }
}
