//! Authentication flows and per-request credential checks.

pub mod authenticator;
pub mod request;
pub mod revoker;
pub mod service;

pub use authenticator::Authenticator;
pub use request::{LoginRequest, RegisterRequest};
pub use revoker::TokenRevoker;
pub use service::{AuthResult, AuthService};
