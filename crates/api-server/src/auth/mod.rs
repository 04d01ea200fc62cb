//! Bearer-token sessions for the REST API

mod bearer;
mod jwt;

pub use bearer::resolve_identity;
pub use jwt::{format_expiry, SessionClaims, TokenIssuer};
