//! Session self-service.

pub mod service;

pub use service::SessionService;
