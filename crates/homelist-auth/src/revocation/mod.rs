//! Revocation registry (JTI blacklist).

pub mod registry;

pub use registry::RevocationRegistry;
