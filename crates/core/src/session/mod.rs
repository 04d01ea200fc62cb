//! Session handling
//!
//! Identity providers, the session state machine and the local account list.

mod accounts;
mod gate;
mod local_provider;
mod model;
mod provider;

pub mod credentials;

pub use accounts::AccountBook;
pub use gate::SessionGate;
pub use local_provider::LocalIdentityProvider;
pub use model::*;
pub use provider::IdentityProvider;
