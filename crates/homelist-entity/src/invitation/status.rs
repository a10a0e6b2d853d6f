//! Invitation kind, status and response enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use homelist_core::{AppError, ErrorReason};

/// Who initiated the invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invitation_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvitationKind {
    /// Sent by the home creator to an email address.
    Invite,
    /// Sent by a non-member asking to join.
    Request,
}

impl InvitationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invite => "invite",
            Self::Request => "request",
        }
    }
}

impl fmt::Display for InvitationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Invitation lifecycle state. `Accepted` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invitation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl InvitationStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Only `pending -> accepted | rejected` is allowed.
    pub fn can_transition_to(&self, next: InvitationStatus) -> bool {
        matches!(self, Self::Pending) && next.is_terminal()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A response to a pending invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationAction {
    Accept,
    Reject,
}

impl InvitationAction {
    /// The status this action moves a pending invitation to.
    pub fn target_status(&self) -> InvitationStatus {
        match self {
            Self::Accept => InvitationStatus::Accepted,
            Self::Reject => InvitationStatus::Rejected,
        }
    }
}

impl FromStr for InvitationAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "accept" => Ok(Self::Accept),
            "reject" => Ok(Self::Reject),
            _ => Err(AppError::validation(
                ErrorReason::InvalidAction,
                format!("Invalid action '{s}'. Expected 'accept' or 'reject'"),
            )),
        }
    }
}
