//! Injectable bundle of repository handles.

use std::fmt;
use std::sync::Arc;

use sqlx::PgPool;

use crate::memory::{
    MemoryBlacklistRepository, MemoryHomeRepository, MemoryInvitationRepository,
    MemorySessionRepository, MemoryShoppingListRepository, MemoryUserRepository,
};
use crate::repositories::{
    BlacklistRepository, HomeRepository, InvitationRepository, PgBlacklistRepository,
    PgHomeRepository, PgInvitationRepository, PgSessionRepository, PgShoppingListRepository,
    PgUserRepository, SessionRepository, ShoppingListRepository, UserRepository,
};

/// One handle per collection, shared by every component that needs it.
///
/// Built once by the process entry point and cloned into components.
#[derive(Clone)]
pub struct Store {
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub blacklist: Arc<dyn BlacklistRepository>,
    pub homes: Arc<dyn HomeRepository>,
    pub invitations: Arc<dyn InvitationRepository>,
    pub shopping_lists: Arc<dyn ShoppingListRepository>,
}

impl Store {
    /// Repositories backed by PostgreSQL.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            sessions: Arc::new(PgSessionRepository::new(pool.clone())),
            blacklist: Arc::new(PgBlacklistRepository::new(pool.clone())),
            homes: Arc::new(PgHomeRepository::new(pool.clone())),
            invitations: Arc::new(PgInvitationRepository::new(pool.clone())),
            shopping_lists: Arc::new(PgShoppingListRepository::new(pool)),
        }
    }

    /// Process-local repositories.
    pub fn memory() -> Self {
        Self {
            users: Arc::new(MemoryUserRepository::new()),
            sessions: Arc::new(MemorySessionRepository::new()),
            blacklist: Arc::new(MemoryBlacklistRepository::new()),
            homes: Arc::new(MemoryHomeRepository::new()),
            invitations: Arc::new(MemoryInvitationRepository::new()),
            shopping_lists: Arc::new(MemoryShoppingListRepository::new()),
        }
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}
