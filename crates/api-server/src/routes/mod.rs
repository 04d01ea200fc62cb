//! Route handlers

pub mod auth;
pub mod health;
pub mod task;

use axum::{http::StatusCode, Json};
use taskflow_core::remote::wire::{ErrorBody, ErrorCode};
use taskflow_core::{Error, ErrorKind};

pub type RouteError = (StatusCode, Json<ErrorBody>);

pub fn route_error(status: StatusCode, code: ErrorCode, error: impl Into<String>) -> RouteError {
    (status, Json(ErrorBody::new(code, error)))
}

pub fn unauthorized(error: impl Into<String>) -> RouteError {
    route_error(StatusCode::UNAUTHORIZED, ErrorCode::Unauthenticated, error)
}

pub fn not_found(error: impl Into<String>) -> RouteError {
    route_error(StatusCode::NOT_FOUND, ErrorCode::NotFound, error)
}

pub fn bad_request(error: impl Into<String>) -> RouteError {
    route_error(StatusCode::BAD_REQUEST, ErrorCode::Validation, error)
}

pub fn internal_error(error: impl std::fmt::Display) -> RouteError {
    route_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorCode::Backend,
        error.to_string(),
    )
}

/// Map a core error onto its HTTP status and wire body
pub fn core_error(err: impl Into<Error>) -> RouteError {
    let err = err.into();
    let status = match err.kind() {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthenticated | ErrorKind::WrongSecret => StatusCode::UNAUTHORIZED,
        ErrorKind::UnknownIdentity | ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict | ErrorKind::Busy => StatusCode::CONFLICT,
        ErrorKind::Backend => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!("Request failed: {}", err);
    }
    (status, Json(ErrorBody::from_error(&err)))
}
