//! User domain records.

pub mod model;
pub mod provider;

pub use model::{
    NewUser, Preferences, ProfileUpdate, User, UserSummary, default_preferences, normalize_handle,
};
pub use provider::AuthProvider;
