//! # homelist-auth
//!
//! Credential lifecycle for HomeList.
//!
//! ## Modules
//!
//! - `jwt`: signed access/refresh credential issuance and verification
//! - `revocation`: the JTI blacklist consulted on every request
//! - `session`: per-login session tracking and the retention sweep
//! - `password`: Argon2id hashing and password policy
//! - `oauth`: federated identity providers

pub mod jwt;
pub mod oauth;
pub mod password;
pub mod revocation;
pub mod session;

pub use jwt::{Claims, IssuedToken, JwtDecoder, JwtEncoder, TokenPair};
pub use oauth::{ExternalIdentity, GoogleIdentityProvider, IdentityProvider, ProviderAssertion};
pub use password::{PasswordHasher, PasswordValidator};
pub use revocation::RevocationRegistry;
pub use session::{CleanupReport, SessionCleanup, SessionManager};
