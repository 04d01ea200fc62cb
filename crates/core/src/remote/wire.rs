//! Request and response bodies of the TaskFlow REST API

use serde::{Deserialize, Serialize};

use crate::session::{AuthError, Identity};
use crate::{Error, ErrorKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub uid: String,
    pub email: String,
}

impl From<Identity> for AccountResponse {
    fn from(identity: Identity) -> Self {
        Self {
            uid: identity.uid,
            email: identity.email,
        }
    }
}

impl From<AccountResponse> for Identity {
    fn from(account: AccountResponse) -> Self {
        Self {
            uid: account.uid,
            email: account.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: String,
    pub uid: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    Unauthenticated,
    UnknownIdentity,
    WrongSecret,
    Conflict,
    NotFound,
    Busy,
    Backend,
}

impl From<ErrorKind> for ErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Validation => Self::Validation,
            ErrorKind::Unauthenticated => Self::Unauthenticated,
            ErrorKind::UnknownIdentity => Self::UnknownIdentity,
            ErrorKind::WrongSecret => Self::WrongSecret,
            ErrorKind::Conflict => Self::Conflict,
            ErrorKind::NotFound => Self::NotFound,
            ErrorKind::Busy => Self::Busy,
            ErrorKind::Backend => Self::Backend,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: ErrorCode,
}

impl ErrorBody {
    pub fn new(code: ErrorCode, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }

    /// Describe `err` so that [`ErrorBody::into_error`] rebuilds the same kind
    pub fn from_error(err: &Error) -> Self {
        let detail = match err {
            Error::Validation(detail)
            | Error::TaskNotFound(detail)
            | Error::Busy(detail)
            | Error::Persistence(detail) => detail.clone(),
            Error::Auth(
                AuthError::InvalidInput(detail)
                | AuthError::UnknownIdentity(detail)
                | AuthError::Conflict(detail)
                | AuthError::Backend(detail),
            ) => detail.clone(),
            other => other.to_string(),
        };
        Self::new(err.kind().into(), detail)
    }

    /// Rebuild the client-side error this body describes
    pub fn into_error(self) -> Error {
        match self.code {
            ErrorCode::Validation => Error::Validation(self.error),
            ErrorCode::Unauthenticated => Error::Unauthenticated,
            ErrorCode::UnknownIdentity => Error::Auth(AuthError::UnknownIdentity(self.error)),
            ErrorCode::WrongSecret => Error::Auth(AuthError::WrongSecret),
            ErrorCode::Conflict => Error::Auth(AuthError::Conflict(self.error)),
            ErrorCode::NotFound => Error::TaskNotFound(self.error),
            ErrorCode::Busy => Error::Busy(self.error),
            ErrorCode::Backend => Error::Persistence(self.error),
        }
    }
}
