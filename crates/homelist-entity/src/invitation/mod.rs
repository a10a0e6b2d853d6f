//! Home invitation and join-request records.

pub mod model;
pub mod status;

pub use model::HomeInvitation;
pub use status::{InvitationAction, InvitationKind, InvitationStatus};
