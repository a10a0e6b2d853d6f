use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use homelist_core::result::AppResult;
use homelist_core::types::{HomeId, InvitationId, UserId};
use homelist_entity::invitation::{HomeInvitation, InvitationKind, InvitationStatus};

use crate::error::unique_violation;
use crate::repositories::InvitationRepository;

/// In-memory [`InvitationRepository`] with the pending-uniqueness rules of the schema.
#[derive(Debug, Default)]
pub struct MemoryInvitationRepository {
    invitations: RwLock<HashMap<InvitationId, HomeInvitation>>,
}

impl MemoryInvitationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn select(&self, pred: impl Fn(&HomeInvitation) -> bool) -> Vec<HomeInvitation> {
        let invitations = self.invitations.read().await;
        let mut found: Vec<HomeInvitation> =
            invitations.values().filter(|i| pred(i)).cloned().collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found
    }
}

#[async_trait]
impl InvitationRepository for MemoryInvitationRepository {
    async fn create(&self, invitation: &HomeInvitation) -> AppResult<()> {
        let mut invitations = self.invitations.write().await;
        if invitations.values().any(|i| i.conflicts_with(invitation)) {
            return Err(unique_violation(Some(match invitation.kind {
                InvitationKind::Invite => "home_invitations_pending_invite_key",
                InvitationKind::Request => "home_invitations_pending_request_key",
            })));
        }
        invitations.insert(invitation.id, invitation.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: InvitationId) -> AppResult<Option<HomeInvitation>> {
        Ok(self.invitations.read().await.get(&id).cloned())
    }

    async fn find_pending_invite(
        &self,
        home_id: HomeId,
        email: &str,
    ) -> AppResult<Option<HomeInvitation>> {
        Ok(self
            .select(|i| {
                i.is_pending()
                    && i.kind == InvitationKind::Invite
                    && i.home_id == home_id
                    && i.to_email == email
            })
            .await
            .into_iter()
            .next())
    }

    async fn find_pending_request(
        &self,
        home_id: HomeId,
        from_user_id: UserId,
    ) -> AppResult<Option<HomeInvitation>> {
        Ok(self
            .select(|i| {
                i.is_pending()
                    && i.kind == InvitationKind::Request
                    && i.home_id == home_id
                    && i.from_user_id == from_user_id
            })
            .await
            .into_iter()
            .next())
    }

    async fn transition(
        &self,
        id: InvitationId,
        next: InvitationStatus,
        now: DateTime<Utc>,
    ) -> AppResult<Option<HomeInvitation>> {
        let mut invitations = self.invitations.write().await;
        Ok(invitations
            .get_mut(&id)
            .filter(|inv| inv.is_pending())
            .and_then(|inv| inv.transition(next, now).then(|| inv.clone())))
    }

    async fn list_pending_for_recipient(
        &self,
        user_id: UserId,
        email: &str,
    ) -> AppResult<Vec<HomeInvitation>> {
        Ok(self
            .select(|i| i.is_pending() && i.is_addressed_to(user_id, email))
            .await)
    }

    async fn list_pending_requests_for_creator(
        &self,
        creator_id: UserId,
    ) -> AppResult<Vec<HomeInvitation>> {
        // Requests are addressed to the creator when they are created.
        Ok(self
            .select(|i| {
                i.is_pending()
                    && i.kind == InvitationKind::Request
                    && i.to_user_id == Some(creator_id)
            })
            .await)
    }

    async fn list_sent_by(&self, user_id: UserId) -> AppResult<Vec<HomeInvitation>> {
        Ok(self.select(|i| i.from_user_id == user_id).await)
    }

    async fn delete_by_home(&self, home_id: HomeId) -> AppResult<u64> {
        let mut invitations = self.invitations.write().await;
        let before = invitations.len();
        invitations.retain(|_, i| i.home_id != home_id);
        Ok(before.saturating_sub(invitations.len()) as u64)
    }
}
