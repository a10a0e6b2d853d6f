//! Registration, login, refresh and logout.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use homelist_auth::{
    ExternalIdentity, IdentityProvider, IssuedToken, JwtDecoder, JwtEncoder, PasswordHasher,
    PasswordValidator, ProviderAssertion, SessionManager,
};
use homelist_core::error::{AppError, ErrorReason};
use homelist_core::types::{Jti, SessionId};
use homelist_database::repositories::UserRepository;
use homelist_entity::session::DeviceInfo;
use homelist_entity::token::TokenKind;
use homelist_entity::user::{AuthProvider, NewUser, User, normalize_handle};

use crate::context::RequestContext;

use super::request::{LoginRequest, RegisterRequest};
use super::revoker::TokenRevoker;

/// Attempts at a free handle before giving up on a federated sign-up.
const MAX_HANDLE_ATTEMPTS: u32 = 100;

/// Outcome of every flow that starts a session.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResult {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    pub session_id: SessionId,
}

/// Drives the credential state machine over sessions and the blacklist.
///
/// Each login lineage is a session holding one access JTI and one refresh
/// JTI. Refresh replaces the access JTI and blacklists the old one; logout
/// ends the session and blacklists both.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    sessions: SessionManager,
    revoker: TokenRevoker,
    encoder: JwtEncoder,
    decoder: JwtDecoder,
    hasher: Arc<PasswordHasher>,
    validator: PasswordValidator,
    providers: Vec<Arc<dyn IdentityProvider>>,
    link_existing_accounts: bool,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("providers", &self.providers.len())
            .field("link_existing_accounts", &self.link_existing_accounts)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: SessionManager,
        revoker: TokenRevoker,
        encoder: JwtEncoder,
        decoder: JwtDecoder,
        hasher: Arc<PasswordHasher>,
        validator: PasswordValidator,
    ) -> Self {
        Self {
            users,
            sessions,
            revoker,
            encoder,
            decoder,
            hasher,
            validator,
            providers: Vec::new(),
            link_existing_accounts: true,
        }
    }

    /// Register a federated identity provider.
    pub fn with_identity_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Whether a federated login may attach to an existing account with the
    /// same email.
    pub fn with_account_linking(mut self, enabled: bool) -> Self {
        self.link_existing_accounts = enabled;
        self
    }

    /// Create a password account and start its first session.
    ///
    /// Duplicate email or username is rejected before any credential is minted.
    pub async fn register(
        &self,
        req: RegisterRequest,
        device: DeviceInfo,
    ) -> Result<AuthResult, AppError> {
        let req = req.normalized();
        req.check()?;
        self.validator
            .validate(&req.password, &[&req.email, &req.username, &req.name])?;

        if self.users.find_by_email(&req.email).await?.is_some() {
            return Err(AppError::conflict(
                ErrorReason::DuplicateEmail,
                "Email already registered",
            ));
        }
        if self.users.find_by_username(&req.username).await?.is_some() {
            return Err(AppError::conflict(
                ErrorReason::DuplicateUsername,
                "Username already taken",
            ));
        }

        let hash = self.hasher.hash_password(&req.password)?;
        let user = self
            .users
            .create(
                NewUser::local(&req.email, &req.username, hash, &req.name),
                Utc::now(),
            )
            .await?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        self.start_session(user, device).await
    }

    /// Password login. Unknown email, federated-only accounts and wrong
    /// passwords are indistinguishable to the caller.
    pub async fn login(&self, req: LoginRequest, device: DeviceInfo) -> Result<AuthResult, AppError> {
        req.check()?;
        let email = normalize_handle(&req.email);
        let user = self.users.find_by_email(&email).await?;

        let hash = user.as_ref().and_then(|u| u.password_hash.as_deref());
        let matched = self.hasher.check(&req.password, hash);
        let user = match user {
            Some(user) if matched => user,
            _ => {
                warn!("Failed login attempt");
                return Err(invalid_credentials());
            }
        };

        info!(user_id = %user.id, "User logged in");
        self.start_session(user, device).await
    }

    /// Log in with an identity asserted by an external provider.
    ///
    /// The account is found by external id, else linked by email, else
    /// created with a handle derived from the email local part.
    pub async fn federated_login(
        &self,
        provider: AuthProvider,
        assertion: &ProviderAssertion,
        device: DeviceInfo,
    ) -> Result<AuthResult, AppError> {
        let idp = self
            .providers
            .iter()
            .find(|p| p.provider() == provider)
            .ok_or_else(|| {
                AppError::configuration(format!("Identity provider '{provider}' is not configured"))
            })?;

        let identity = idp.verify(assertion).await?;
        let user = self.resolve_federated_user(provider, &identity).await?;

        info!(user_id = %user.id, provider = %provider, "Federated login");
        self.start_session(user, device).await
    }

    /// Mint a new access credential for the session holding `refresh_token`.
    ///
    /// The refresh credential itself is not rotated. If another refresh on
    /// the same session lands first the call fails and the credential it
    /// minted is discarded.
    pub async fn refresh(&self, refresh_token: &str) -> Result<IssuedToken, AppError> {
        let claims = self.decoder.decode(refresh_token, TokenKind::Refresh)?;
        self.revoker.registry().ensure_not_revoked(claims.jti).await?;

        let session = self
            .sessions
            .find_by_refresh_jti(claims.jti)
            .await?
            .filter(|s| s.user_id == claims.user_id())
            .ok_or_else(session_not_found)?;

        if self.users.find_by_id(session.user_id).await?.is_none() {
            return Err(AppError::authentication(
                ErrorReason::InvalidToken,
                "User not found",
            ));
        }

        let access = self.encoder.issue(session.user_id, TokenKind::Access)?;
        let rotated = self
            .sessions
            .rotate_access_jti(session.id, session.access_jti, access.jti)
            .await?;

        if rotated.is_none() {
            return match self.sessions.get(session.id).await? {
                Some(current) if current.is_active => {
                    warn!(session_id = %session.id, "Concurrent refresh lost the race");
                    Err(AppError::conflict(
                        ErrorReason::ConcurrentRefresh,
                        "Session was refreshed concurrently",
                    ))
                }
                _ => Err(session_not_found()),
            };
        }

        self.revoker.revoke_access(session.access_jti).await?;
        info!(user_id = %session.user_id, session_id = %session.id, "Access token refreshed");
        Ok(access)
    }

    /// End the session that `access_token` belongs to.
    ///
    /// The presented JTI is blacklisted even when no session matches it.
    pub async fn logout(&self, access_token: &str) -> Result<(), AppError> {
        let claims = self.decoder.decode(access_token, TokenKind::Access)?;
        self.revoker.registry().ensure_not_revoked(claims.jti).await?;
        self.revoker
            .revoke_access_until(claims.jti, claims.expires_at())
            .await?;

        if let Some(session) = self.sessions.find_by_access_jti(claims.jti).await? {
            if let Some(ended) = self.sessions.invalidate(session.id).await? {
                self.revoker.revoke_session(&ended).await?;
            }
        }

        info!(user_id = %claims.user_id(), "User logged out");
        Ok(())
    }

    /// End every session of the caller, optionally keeping the current one.
    ///
    /// Returns the number of sessions ended.
    pub async fn logout_everywhere(
        &self,
        ctx: &RequestContext,
        keep_current: bool,
    ) -> Result<usize, AppError> {
        let except = if keep_current { ctx.session_id } else { None };
        let ended = self
            .sessions
            .invalidate_all_for_user(ctx.user_id, except)
            .await?;

        for session in &ended {
            self.revoker.revoke_session(session).await?;
        }
        if !keep_current {
            self.revoker.revoke_access(ctx.jti).await?;
        }

        info!(user_id = %ctx.user_id, count = ended.len(), keep_current, "Logged out everywhere");
        Ok(ended.len())
    }

    /// The authenticated user's account.
    pub async fn me(&self, ctx: &RequestContext) -> Result<User, AppError> {
        self.users
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    pub async fn is_revoked(&self, jti: Jti) -> Result<bool, AppError> {
        self.revoker.registry().is_blacklisted(jti).await
    }

    async fn start_session(&self, user: User, device: DeviceInfo) -> Result<AuthResult, AppError> {
        let pair = self.encoder.issue_pair(user.id)?;
        let session = self
            .sessions
            .create_session(user.id, pair.access.jti, pair.refresh.jti, device)
            .await?;

        Ok(AuthResult {
            user,
            access_token: pair.access.token,
            refresh_token: pair.refresh.token,
            session_id: session.id,
        })
    }

    async fn resolve_federated_user(
        &self,
        provider: AuthProvider,
        identity: &ExternalIdentity,
    ) -> Result<User, AppError> {
        if let Some(user) = self.users.find_by_external_id(&identity.subject).await? {
            return Ok(user);
        }

        let email = normalize_handle(&identity.email);
        if let Some(existing) = self.users.find_by_email(&email).await? {
            if !self.link_existing_accounts || existing.is_linked() {
                return Err(email_collision());
            }
            let linked = self
                .users
                .link_external_id(existing.id, &identity.subject, Utc::now())
                .await?
                .ok_or_else(email_collision)?;
            info!(user_id = %linked.id, provider = %provider, "Federated identity linked");
            return Ok(linked);
        }

        self.create_federated_user(provider, identity, &email).await
    }

    async fn create_federated_user(
        &self,
        provider: AuthProvider,
        identity: &ExternalIdentity,
        email: &str,
    ) -> Result<User, AppError> {
        let base = handle_base(email);
        let name = identity
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&base)
            .to_string();

        for attempt in 0..MAX_HANDLE_ATTEMPTS {
            let username = if attempt == 0 {
                base.clone()
            } else {
                format!("{base}{attempt}")
            };
            if self.users.find_by_username(&username).await?.is_some() {
                continue;
            }

            let new_user = NewUser::federated(
                provider,
                email,
                &username,
                &identity.subject,
                &name,
                identity.picture.clone(),
            );
            match self.users.create(new_user, Utc::now()).await {
                Ok(user) => {
                    info!(user_id = %user.id, username = %user.username, "Federated account created");
                    return Ok(user);
                }
                Err(e) if e.is(ErrorReason::DuplicateUsername) => continue,
                Err(e) if e.is(ErrorReason::DuplicateEmail) => return Err(email_collision()),
                Err(e) => return Err(e),
            }
        }

        Err(AppError::conflict(
            ErrorReason::DuplicateUsername,
            "Could not allocate a unique username",
        ))
    }
}

/// Lower-cased email local part, or `user` when it is empty.
fn handle_base(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let local = normalize_handle(local);
    if local.is_empty() {
        "user".to_string()
    } else {
        local
    }
}

fn invalid_credentials() -> AppError {
    AppError::authentication(ErrorReason::InvalidCredentials, "Invalid email or password")
}

fn session_not_found() -> AppError {
    AppError::authentication(
        ErrorReason::SessionNotFound,
        "Refresh token is unknown or its session has ended",
    )
}

fn email_collision() -> AppError {
    AppError::authentication(
        ErrorReason::EmailCollision,
        "An account with this email already exists",
    )
}
