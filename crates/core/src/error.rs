//! Error types for the core library

use thiserror::Error;

use crate::session::AuthError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not signed in")]
    Unauthenticated,

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Request already in progress: {0}")]
    Busy(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// User-facing classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Unauthenticated,
    UnknownIdentity,
    WrongSecret,
    Conflict,
    NotFound,
    Busy,
    Backend,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Unauthenticated => ErrorKind::Unauthenticated,
            Self::TaskNotFound(_) => ErrorKind::NotFound,
            Self::Busy(_) => ErrorKind::Busy,
            Self::Auth(err) => err.kind(),
            Self::Persistence(_) | Self::Io(_) | Self::Serialization(_) => ErrorKind::Backend,
        }
    }
}
