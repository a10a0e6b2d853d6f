//! # homelist-entity
//!
//! Domain records for HomeList. Every struct in this crate represents a
//! stored document or a domain value object. All records derive `Debug`,
//! `Clone`, `Serialize`, `Deserialize`, and stored records additionally
//! derive `sqlx::FromRow`.
//!
//! Constructors enforce the record invariants: normalised emails and
//! usernames, a creator that is always a home member, and one-way
//! invitation status transitions.

pub mod home;
pub mod invitation;
pub mod session;
pub mod shopping_list;
pub mod token;
pub mod user;
