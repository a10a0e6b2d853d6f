//! Invitations and join requests.

pub mod service;
pub mod view;

pub use service::{InvitationService, InviteRequest, RespondOutcome};
pub use view::InvitationView;
