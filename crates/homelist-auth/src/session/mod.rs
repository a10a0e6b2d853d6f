//! Session lifecycle management and maintenance.

pub mod cleanup;
pub mod manager;

pub use cleanup::{CleanupReport, SessionCleanup};
pub use manager::SessionManager;
