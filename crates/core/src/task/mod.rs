//! Task module
//!
//! Task records, the repository seam, the local backend and the in-memory
//! store the application renders from.

mod local_store;
mod model;
mod repository;
mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use local_store::LocalTaskRepository;
pub use model::*;
pub use repository::TaskRepository;
pub use store::TaskStore;
