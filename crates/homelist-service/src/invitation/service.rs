//! The invitation state machine: `pending -> accepted | rejected`.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::ValidateEmail;

use homelist_core::error::{AppError, ErrorReason};
use homelist_core::types::{HomeId, InvitationId, UserId};
use homelist_database::repositories::{
    HomeRepository, InvitationRepository, MemberUpdate, UserRepository,
};
use homelist_entity::home::{Home, HomeSummary};
use homelist_entity::invitation::{HomeInvitation, InvitationAction, InvitationKind};
use homelist_entity::user::{User, UserSummary, normalize_handle};

use crate::context::RequestContext;
use crate::home::service::home_not_found;

use super::view::InvitationView;

/// Data for inviting someone to a home.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InviteRequest {
    pub email: String,
    #[serde(default)]
    pub message: String,
}

/// Result of answering an invitation.
#[derive(Debug, Clone, Serialize)]
pub struct RespondOutcome {
    pub invitation: HomeInvitation,
    /// The home after the new member was added; `None` on reject.
    pub home: Option<Home>,
}

/// Creates and resolves invitations and join requests.
///
/// Resolution is a compare-and-set on `pending`, so answering the same
/// invitation twice, even concurrently, has its effect once.
#[derive(Clone)]
pub struct InvitationService {
    invitations: Arc<dyn InvitationRepository>,
    homes: Arc<dyn HomeRepository>,
    users: Arc<dyn UserRepository>,
}

impl std::fmt::Debug for InvitationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvitationService").finish_non_exhaustive()
    }
}

impl InvitationService {
    pub fn new(
        invitations: Arc<dyn InvitationRepository>,
        homes: Arc<dyn HomeRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            invitations,
            homes,
            users,
        }
    }

    /// Invite an email address to a home. Creator only.
    pub async fn invite_to_home(
        &self,
        ctx: &RequestContext,
        home_id: HomeId,
        req: InviteRequest,
    ) -> Result<HomeInvitation, AppError> {
        let email = normalize_handle(&req.email);
        if email.is_empty() {
            return Err(AppError::validation(
                ErrorReason::MissingField,
                "Email is required",
            ));
        }
        if !email.validate_email() {
            return Err(AppError::validation(
                ErrorReason::InvalidEmail,
                "Invalid email format",
            ));
        }

        let home = self.load_home(home_id).await?;
        if !home.is_creator(ctx.user_id) {
            return Err(AppError::forbidden(
                "Only the home creator can send invitations",
            ));
        }

        let recipient = self.users.find_by_email(&email).await?;
        if recipient.as_ref().is_some_and(|u| home.is_member(u.id)) {
            return Err(already_member());
        }
        if self
            .invitations
            .find_pending_invite(home_id, &email)
            .await?
            .is_some()
        {
            return Err(duplicate_pending("An invitation to this email is already pending"));
        }

        let invitation = HomeInvitation::invite(
            home_id,
            ctx.user_id,
            &email,
            recipient.map(|u| u.id),
            &req.message,
            Utc::now(),
        );
        self.invitations.create(&invitation).await?;

        info!(
            user_id = %ctx.user_id,
            home_id = %home_id,
            invitation_id = %invitation.id,
            "Invitation sent"
        );
        Ok(invitation)
    }

    /// Ask to join a home. The request is addressed to its creator.
    pub async fn request_join(
        &self,
        ctx: &RequestContext,
        home_id: HomeId,
        message: &str,
    ) -> Result<HomeInvitation, AppError> {
        let home = self.load_home(home_id).await?;
        if home.is_member(ctx.user_id) {
            return Err(already_member());
        }

        let creator = self
            .users
            .find_by_id(home.creator_id)
            .await?
            .ok_or_else(|| AppError::not_found("Home creator not found"))?;

        if self
            .invitations
            .find_pending_request(home_id, ctx.user_id)
            .await?
            .is_some()
        {
            return Err(duplicate_pending("A join request for this home is already pending"));
        }

        let request = HomeInvitation::request(
            home_id,
            ctx.user_id,
            &creator.email,
            creator.id,
            message,
            Utc::now(),
        );
        self.invitations.create(&request).await?;

        info!(
            user_id = %ctx.user_id,
            home_id = %home_id,
            invitation_id = %request.id,
            "Join request sent"
        );
        Ok(request)
    }

    /// Accept or reject a pending invitation or join request.
    ///
    /// Invites are answered by their recipient, requests by the home creator.
    pub async fn respond_to_invitation(
        &self,
        ctx: &RequestContext,
        invitation_id: InvitationId,
        action: InvitationAction,
    ) -> Result<RespondOutcome, AppError> {
        let invitation = self
            .invitations
            .find_by_id(invitation_id)
            .await?
            .ok_or_else(|| AppError::not_found("Invitation not found"))?;
        if !invitation.is_pending() {
            return Err(already_resolved(&invitation));
        }

        let home = self.load_home(invitation.home_id).await?;
        let joining = match invitation.kind {
            InvitationKind::Invite => {
                let actor = self.actor(ctx).await?;
                if !invitation.is_addressed_to(actor.id, &actor.email) {
                    return Err(AppError::forbidden("This invitation is not addressed to you"));
                }
                actor.id
            }
            InvitationKind::Request => {
                if !home.is_creator(ctx.user_id) {
                    return Err(AppError::forbidden(
                        "Only the home creator can answer join requests",
                    ));
                }
                invitation.from_user_id
            }
        };

        if action == InvitationAction::Accept && home.is_member(joining) {
            return Err(already_member());
        }

        let resolved = self
            .invitations
            .transition(invitation_id, action.target_status(), Utc::now())
            .await?
            .ok_or_else(|| already_resolved(&invitation))?;

        let home = match action {
            InvitationAction::Accept => Some(self.add_member(home.id, joining).await?),
            InvitationAction::Reject => None,
        };

        info!(
            user_id = %ctx.user_id,
            invitation_id = %invitation_id,
            kind = %resolved.kind.as_str(),
            status = %resolved.status,
            "Invitation resolved"
        );
        Ok(RespondOutcome {
            invitation: resolved,
            home,
        })
    }

    /// Pending invites addressed to the caller, newest first.
    pub async fn pending_for_user(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<InvitationView>, AppError> {
        let actor = self.actor(ctx).await?;
        let mut pending = self
            .invitations
            .list_pending_for_recipient(actor.id, &actor.email)
            .await?;
        pending.retain(|i| i.kind == InvitationKind::Invite);
        self.with_details(pending).await
    }

    /// Pending join requests for homes the caller created, newest first.
    pub async fn pending_requests_for_creator(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<InvitationView>, AppError> {
        let requests = self
            .invitations
            .list_pending_requests_for_creator(ctx.user_id)
            .await?;
        self.with_details(requests).await
    }

    /// Everything the caller sent, newest first.
    pub async fn sent_by_user(&self, ctx: &RequestContext) -> Result<Vec<InvitationView>, AppError> {
        let sent = self.invitations.list_sent_by(ctx.user_id).await?;
        self.with_details(sent).await
    }

    /// Attach the home summary and sender to each invitation.
    async fn with_details(
        &self,
        invitations: Vec<HomeInvitation>,
    ) -> Result<Vec<InvitationView>, AppError> {
        let mut homes: HashMap<HomeId, Option<HomeSummary>> = HashMap::new();
        for invitation in &invitations {
            if !homes.contains_key(&invitation.home_id) {
                let home = self.homes.find_by_id(invitation.home_id).await?;
                homes.insert(invitation.home_id, home.as_ref().map(HomeSummary::from));
            }
        }

        let mut sender_ids: Vec<UserId> = invitations.iter().map(|i| i.from_user_id).collect();
        sender_ids.sort();
        sender_ids.dedup();
        let senders: HashMap<UserId, UserSummary> = self
            .users
            .find_many(&sender_ids)
            .await?
            .iter()
            .map(|u| (u.id, UserSummary::from(u)))
            .collect();

        Ok(invitations
            .into_iter()
            .map(|invitation| InvitationView {
                home: homes.get(&invitation.home_id).cloned().flatten(),
                from_user: senders.get(&invitation.from_user_id).cloned(),
                invitation,
            })
            .collect())
    }

    async fn add_member(&self, home_id: HomeId, user_id: UserId) -> Result<Home, AppError> {
        match self.homes.add_member(home_id, user_id, Utc::now()).await? {
            MemberUpdate::Applied(home) => {
                info!(home_id = %home_id, member_id = %user_id, "Member added");
                Ok(home)
            }
            MemberUpdate::Unchanged => Err(already_member()),
            MemberUpdate::HomeNotFound => Err(home_not_found()),
        }
    }

    async fn actor(&self, ctx: &RequestContext) -> Result<User, AppError> {
        self.users
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    async fn load_home(&self, home_id: HomeId) -> Result<Home, AppError> {
        self.homes
            .find_by_id(home_id)
            .await?
            .ok_or_else(home_not_found)
    }
}

fn already_member() -> AppError {
    AppError::conflict(ErrorReason::AlreadyMember, "User is already a member of this home")
}

fn duplicate_pending(message: &str) -> AppError {
    AppError::conflict(ErrorReason::DuplicatePending, message)
}

fn already_resolved(invitation: &HomeInvitation) -> AppError {
    AppError::conflict(
        ErrorReason::InvalidAction,
        format!("Invitation has already been {}", invitation.status),
    )
}
