//! Home and membership services.

pub mod service;

pub use service::{CreateHomeRequest, HomeService, UpdateHomeRequest};
