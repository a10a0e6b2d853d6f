//! Federated identity providers.

pub mod google;
pub mod provider;

pub use google::GoogleIdentityProvider;
pub use provider::{ExternalIdentity, IdentityProvider, ProviderAssertion};
