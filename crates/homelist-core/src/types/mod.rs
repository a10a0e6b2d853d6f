//! Shared value types: typed identifiers and boundary response bodies.

pub mod id;
pub mod response;

pub use id::{HomeId, InvitationId, Jti, SessionId, ShoppingListId, UserId};
pub use response::ApiErrorResponse;
