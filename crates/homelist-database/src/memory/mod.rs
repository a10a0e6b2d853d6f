//! In-process implementations of the repository traits.
//!
//! Each document lives in a concurrent map and every operation is atomic
//! per document, matching the guarantees of the PostgreSQL implementations.
//! Collections with cross-document unique keys (users, invitations) guard
//! the whole collection with a `tokio::sync::RwLock` instead.

mod blacklist;
mod home;
mod invitation;
mod session;
mod shopping_list;
mod user;

pub use blacklist::MemoryBlacklistRepository;
pub use home::MemoryHomeRepository;
pub use invitation::MemoryInvitationRepository;
pub use session::MemorySessionRepository;
pub use shopping_list::MemoryShoppingListRepository;
pub use user::MemoryUserRepository;
