//! Core library for TaskFlow
//!
//! This crate contains the to-do application logic, including:
//! - Task model, store and backends
//! - View filters and the task list view-model
//! - Session handling over pluggable identity providers
//! - The application root tying them together

pub mod app;
pub mod clock;
pub mod error;
pub mod filter;
pub mod remote;
pub mod session;
pub mod storage;
pub mod task;
pub mod view;

pub use app::TaskFlowApp;
pub use error::{Error, ErrorKind};
pub use filter::TaskFilter;
pub type Result<T> = std::result::Result<T, Error>;
