//! Password policy enforcement for new passwords.

use homelist_core::config::AuthConfig;
use homelist_core::error::{AppError, ErrorReason};
use zxcvbn::Score;

/// Validates password strength against configured policies.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    /// Minimum password length, in characters.
    min_length: usize,
    /// Minimum zxcvbn score; `None` disables the entropy check.
    min_score: Option<Score>,
}

impl PasswordValidator {
    pub fn new(config: &AuthConfig) -> Self {
        let min_score = match config.password_min_strength {
            0 => None,
            1 => Some(Score::One),
            2 => Some(Score::Two),
            3 => Some(Score::Three),
            _ => Some(Score::Four),
        };
        Self {
            min_length: config.password_min_length,
            min_score,
        }
    }

    /// Validates a password, returning the first violation as `WeakPassword`.
    ///
    /// `user_inputs` (email, username, name) are penalised by the entropy check.
    pub fn validate(&self, password: &str, user_inputs: &[&str]) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(weak(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        if !password.chars().any(char::is_alphabetic) {
            return Err(weak("Password must contain at least one letter"));
        }

        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(weak("Password must contain at least one digit"));
        }

        if let Some(min) = self.min_score {
            let estimate = zxcvbn::zxcvbn(password, user_inputs);
            if estimate.score() < min {
                return Err(weak(
                    "Password is too easy to guess. Please choose a stronger one.",
                ));
            }
        }

        Ok(())
    }
}

fn weak(message: impl Into<String>) -> AppError {
    AppError::validation(ErrorReason::WeakPassword, message)
}
