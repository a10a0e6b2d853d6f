//! User self-service operations: viewing and editing the own profile.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use homelist_core::error::{AppError, ErrorReason};
use homelist_database::repositories::UserRepository;
use homelist_entity::user::{Preferences, ProfileUpdate, User};

use crate::context::RequestContext;

/// Handles user self-service operations.
#[derive(Clone)]
pub struct UserService {
    /// User repository.
    users: Arc<dyn UserRepository>,
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService").finish_non_exhaustive()
    }
}

/// Data for updating a user's own profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    /// New display name (optional).
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
    /// New photo URL (optional).
    pub photo: Option<String>,
    /// Preference keys to merge (optional).
    pub preferences: Option<Preferences>,
}

impl UpdateProfileRequest {
    /// Trim the text fields.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.map(|n| n.trim().to_string()),
            photo: self.photo.map(|p| p.trim().to_string()),
            preferences: self.preferences,
        }
    }

    /// A present name must be non-blank and within length.
    pub fn check(&self) -> Result<(), AppError> {
        if self.name.as_deref().is_some_and(str::is_empty) {
            return Err(AppError::validation(
                ErrorReason::MissingField,
                "Name cannot be empty",
            ));
        }
        self.validate().map_err(|errors| {
            let message = errors
                .field_errors()
                .values()
                .flat_map(|errs| errs.iter())
                .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| "Invalid profile update".to_string());
            AppError::validation(ErrorReason::InvalidInput, message)
        })
    }
}

impl UserService {
    /// Creates a new user service.
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Gets the current user's full profile.
    pub async fn get_profile(&self, ctx: &RequestContext) -> Result<User, AppError> {
        self.users
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Updates the current user's profile fields.
    pub async fn update_profile(
        &self,
        ctx: &RequestContext,
        req: UpdateProfileRequest,
    ) -> Result<User, AppError> {
        let req = req.normalized();
        req.check()?;

        let update = ProfileUpdate {
            name: req.name,
            photo: req.photo,
            preferences: req.preferences,
        };
        if update.is_empty() {
            return self.get_profile(ctx).await;
        }

        let user = self
            .users
            .update_profile(ctx.user_id, &update, Utc::now())
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        info!(user_id = %ctx.user_id, "Profile updated");
        Ok(user)
    }
}
