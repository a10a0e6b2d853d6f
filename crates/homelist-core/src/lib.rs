//! # homelist-core
//!
//! Core crate for HomeList. Contains configuration schemas, typed
//! identifiers, the boundary error body, and the unified error system.
//!
//! This crate has **no** internal dependencies on other HomeList crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind, ErrorReason};
pub use result::AppResult;
