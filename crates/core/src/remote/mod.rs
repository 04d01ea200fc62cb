//! HTTP backends
//!
//! Task repository and identity provider that talk to a TaskFlow server,
//! plus the wire types both sides share.

mod client;
mod identity;
mod tasks;
pub mod wire;

pub use client::ApiClient;
pub use identity::HttpIdentityProvider;
pub use tasks::HttpTaskRepository;
