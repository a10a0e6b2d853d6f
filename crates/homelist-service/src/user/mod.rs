//! User profile services.

pub mod service;

pub use service::{UpdateProfileRequest, UserService};
