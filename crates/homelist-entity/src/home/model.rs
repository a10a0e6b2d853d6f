//! Home record and membership rules.

use chrono::{DateTime, Utc};
use homelist_core::types::{HomeId, UserId};
use homelist_core::{AppError, AppResult, ErrorReason};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Longest accepted home name, in characters.
pub const HOME_NAME_MAX_LEN: usize = 100;

/// A shared group with a member set.
///
/// The creator is inserted as the first member and can never be removed
/// through [`Home::remove_member`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Home {
    /// Unique home identifier.
    pub id: HomeId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// The user who created the home.
    pub creator_id: UserId,
    /// Members in join order; the creator is always present.
    pub members: Vec<UserId>,
    /// When the home was created.
    pub created_at: DateTime<Utc>,
    /// When the home was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Home {
    /// Create a home whose only member is its creator.
    pub fn new(
        creator_id: UserId,
        name: &str,
        description: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        Ok(Self {
            id: HomeId::new(),
            name: validate_name(name)?,
            description: description.trim().to_string(),
            creator_id,
            members: vec![creator_id],
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_creator(&self, user_id: UserId) -> bool {
        self.creator_id == user_id
    }

    pub fn is_member(&self, user_id: UserId) -> bool {
        self.members.contains(&user_id)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Append a member. Returns `false` if already present.
    pub fn add_member(&mut self, user_id: UserId, now: DateTime<Utc>) -> bool {
        if self.is_member(user_id) {
            return false;
        }
        self.members.push(user_id);
        self.updated_at = now;
        true
    }

    /// Remove a non-creator member. Returns `false` for the creator or a non-member.
    pub fn remove_member(&mut self, user_id: UserId, now: DateTime<Utc>) -> bool {
        if self.is_creator(user_id) || !self.is_member(user_id) {
            return false;
        }
        self.members.retain(|m| *m != user_id);
        self.updated_at = now;
        true
    }

    /// Apply a validated update in place.
    pub fn apply(&mut self, update: &HomeUpdate, now: DateTime<Utc>) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(description) = &update.description {
            self.description = description.clone();
        }
        self.updated_at = now;
    }
}

/// Partial home update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HomeUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl HomeUpdate {
    /// Trim fields and check the name rules.
    pub fn normalized(name: Option<&str>, description: Option<&str>) -> AppResult<Self> {
        let name = name.map(validate_name).transpose()?;
        Ok(Self {
            name,
            description: description.map(|d| d.trim().to_string()),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

/// What a non-member may see of a home: enough to decide on an invitation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeSummary {
    pub id: HomeId,
    pub name: String,
    pub description: String,
    pub member_count: usize,
}

impl From<&Home> for HomeSummary {
    fn from(home: &Home) -> Self {
        Self {
            id: home.id,
            name: home.name.clone(),
            description: home.description.clone(),
            member_count: home.member_count(),
        }
    }
}

/// A member as shown in a home's member list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub photo: Option<String>,
    pub is_creator: bool,
}

fn validate_name(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::validation(
            ErrorReason::MissingField,
            "Home name is required",
        ));
    }
    if name.chars().count() > HOME_NAME_MAX_LEN {
        return Err(AppError::validation(
            ErrorReason::InvalidInput,
            format!("Home name must be at most {HOME_NAME_MAX_LEN} characters"),
        ));
    }
    Ok(name.to_string())
}
