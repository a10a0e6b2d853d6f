//! # homelist-database
//!
//! Store access for HomeList. Each record type has a repository trait
//! (the keyed document store with compare-and-set updates), a PostgreSQL
//! implementation and an in-memory implementation. [`Store`] bundles one
//! handle per repository and is injected into every component.

pub mod connection;
pub mod error;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::Store;
