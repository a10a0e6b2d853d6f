//! Repository traits and their PostgreSQL implementations.
//!
//! Every mutation is a single-document operation. Where two writers may
//! race (access-JTI rotation, invitation responses, member changes) the
//! update is conditional on the expected current state and reports whether
//! it applied.

pub mod blacklist;
pub mod home;
pub mod invitation;
pub mod session;
pub mod shopping_list;
pub mod user;

pub use blacklist::{BlacklistRepository, PgBlacklistRepository};
pub use home::{HomeRepository, MemberUpdate, PgHomeRepository};
pub use invitation::{InvitationRepository, PgInvitationRepository};
pub use session::{PgSessionRepository, SessionRepository};
pub use shopping_list::{PgShoppingListRepository, ShoppingListRepository};
pub use user::{PgUserRepository, UserRepository};
