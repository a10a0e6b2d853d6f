//! Invitation record.

use chrono::{DateTime, Utc};
use homelist_core::types::{HomeId, InvitationId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::{InvitationKind, InvitationStatus};
use crate::user::normalize_handle;

/// An `invite` from a home creator, or a join `request` from a non-member.
///
/// For a request the recipient is the home creator.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HomeInvitation {
    pub id: InvitationId,
    pub home_id: HomeId,
    /// The user who sent it.
    pub from_user_id: UserId,
    /// Lower-cased recipient email.
    pub to_email: String,
    /// Recipient account, when one existed at creation time.
    pub to_user_id: Option<UserId>,
    pub kind: InvitationKind,
    pub status: InvitationStatus,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HomeInvitation {
    /// A creator-initiated invitation to an email address.
    pub fn invite(
        home_id: HomeId,
        from_user_id: UserId,
        to_email: &str,
        to_user_id: Option<UserId>,
        message: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self::pending(
            InvitationKind::Invite,
            home_id,
            from_user_id,
            to_email,
            to_user_id,
            message,
            now,
        )
    }

    /// A self-initiated join request addressed to the home creator.
    pub fn request(
        home_id: HomeId,
        from_user_id: UserId,
        creator_email: &str,
        creator_id: UserId,
        message: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self::pending(
            InvitationKind::Request,
            home_id,
            from_user_id,
            creator_email,
            Some(creator_id),
            message,
            now,
        )
    }

    fn pending(
        kind: InvitationKind,
        home_id: HomeId,
        from_user_id: UserId,
        to_email: &str,
        to_user_id: Option<UserId>,
        message: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: InvitationId::new(),
            home_id,
            from_user_id,
            to_email: normalize_handle(to_email),
            to_user_id,
            kind,
            status: InvitationStatus::Pending,
            message: message.trim().to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending
    }

    /// Whether the given account is the recipient, by resolved id or by email.
    pub fn is_addressed_to(&self, user_id: UserId, email: &str) -> bool {
        self.to_user_id == Some(user_id) || self.to_email == normalize_handle(email)
    }

    /// Whether this pending record blocks `other` as a duplicate.
    ///
    /// Invites are unique per (home, email); requests per (home, sender).
    pub fn conflicts_with(&self, other: &HomeInvitation) -> bool {
        if !self.is_pending() || self.home_id != other.home_id || self.kind != other.kind {
            return false;
        }
        match self.kind {
            InvitationKind::Invite => self.to_email == other.to_email,
            InvitationKind::Request => self.from_user_id == other.from_user_id,
        }
    }

    /// Move out of `pending`. Returns `false` if the transition is not allowed.
    pub fn transition(&mut self, next: InvitationStatus, now: DateTime<Utc>) -> bool {
        if !self.status.can_transition_to(next) {
            return false;
        }
        self.status = next;
        self.updated_at = now;
        true
    }
}
