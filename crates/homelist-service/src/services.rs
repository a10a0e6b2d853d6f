//! Wiring of every service over one [`Store`].

use std::sync::Arc;

use homelist_auth::{
    IdentityProvider, JwtDecoder, JwtEncoder, PasswordHasher, PasswordValidator,
    RevocationRegistry, SessionCleanup, SessionManager,
};
use homelist_core::config::AppConfig;
use homelist_core::error::AppError;
use homelist_database::Store;

use crate::auth::{AuthService, Authenticator, TokenRevoker};
use crate::home::HomeService;
use crate::invitation::InvitationService;
use crate::session::SessionService;
use crate::user::UserService;

/// All services, built once by the process entry point and cloned into
/// whatever serves requests.
#[derive(Debug, Clone)]
pub struct Services {
    pub authenticator: Authenticator,
    pub auth: AuthService,
    pub users: UserService,
    pub sessions: SessionService,
    pub homes: HomeService,
    pub invitations: InvitationService,
    pub cleanup: SessionCleanup,
}

impl Services {
    /// Build every service over `store`.
    ///
    /// Identity providers are consulted by federated login in the given order.
    pub fn build(
        store: &Store,
        config: &AppConfig,
        providers: Vec<Arc<dyn IdentityProvider>>,
    ) -> Result<Self, AppError> {
        let registry = RevocationRegistry::new(store.blacklist.clone());
        let session_manager = SessionManager::new(store.sessions.clone());
        let revoker = TokenRevoker::new(registry.clone(), &config.auth);
        let decoder = JwtDecoder::new(&config.auth);

        let mut auth = AuthService::new(
            store.users.clone(),
            session_manager.clone(),
            revoker.clone(),
            JwtEncoder::new(&config.auth),
            decoder.clone(),
            Arc::new(PasswordHasher::new(&config.auth)?),
            PasswordValidator::new(&config.auth),
        )
        .with_account_linking(config.oauth.link_existing_accounts);
        for provider in providers {
            auth = auth.with_identity_provider(provider);
        }

        Ok(Self {
            authenticator: Authenticator::new(
                decoder,
                registry.clone(),
                session_manager.clone(),
                store.users.clone(),
            ),
            auth,
            users: UserService::new(store.users.clone()),
            sessions: SessionService::new(session_manager.clone(), revoker),
            homes: HomeService::new(
                store.homes.clone(),
                store.users.clone(),
                store.invitations.clone(),
                store.shopping_lists.clone(),
            ),
            invitations: InvitationService::new(
                store.invitations.clone(),
                store.homes.clone(),
                store.users.clone(),
            ),
            cleanup: SessionCleanup::new(session_manager, registry, config.session.retention_days),
        })
    }
}
