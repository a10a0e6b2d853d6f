//! Home domain records.

pub mod model;

pub use model::{HOME_NAME_MAX_LEN, Home, HomeSummary, HomeUpdate, MemberSummary};
