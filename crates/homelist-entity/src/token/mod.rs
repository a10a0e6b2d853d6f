//! Credential kinds and revocation records.

pub mod blacklist;
pub mod kind;

pub use blacklist::BlacklistEntry;
pub use kind::TokenKind;
