//! Input records for the authentication flows.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use homelist_core::error::{AppError, ErrorReason};
use homelist_entity::user::normalize_handle;

/// Account registration input.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(max = 50, message = "Username must be at most 50 characters"))]
    pub username: String,
    pub password: String,
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: String,
}

impl RegisterRequest {
    /// Trim every field and lower-case email and username.
    pub fn normalized(self) -> Self {
        Self {
            email: normalize_handle(&self.email),
            username: normalize_handle(&self.username),
            password: self.password,
            name: self.name.trim().to_string(),
        }
    }

    /// Reject missing fields, then malformed ones.
    pub fn check(&self) -> Result<(), AppError> {
        let missing: Vec<&str> = [
            ("email", self.email.as_str()),
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
            ("name", self.name.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            return Err(AppError::validation(
                ErrorReason::MissingField,
                format!("Missing required fields: {}", missing.join(", ")),
            ));
        }

        self.validate().map_err(validation_error)
    }
}

/// Password login input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn check(&self) -> Result<(), AppError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(AppError::validation(
                ErrorReason::MissingField,
                "Email and password are required",
            ));
        }
        Ok(())
    }
}

fn validation_error(errors: ValidationErrors) -> AppError {
    let fields = errors.field_errors();
    if fields.keys().any(|field| *field == "email") {
        return AppError::validation(ErrorReason::InvalidEmail, "Invalid email format");
    }

    let message = fields
        .values()
        .flat_map(|errs| errs.iter())
        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .next()
        .unwrap_or_else(|| "Invalid input".to_string());
    AppError::validation(ErrorReason::InvalidInput, message)
}
