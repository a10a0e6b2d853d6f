//! Argon2id password hashing and verification.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use tracing::warn;

use homelist_core::config::AuthConfig;
use homelist_core::error::{AppError, ErrorKind};

/// Hashes and verifies passwords with Argon2id.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
    /// Verified against when an account has no hash, so a missing account
    /// or a federated-only account costs the same as a wrong password.
    dummy_hash: String,
}

impl PasswordHasher {
    /// Creates a hasher with the configured cost parameters.
    pub fn new(config: &AuthConfig) -> Result<Self, AppError> {
        let params = Params::new(
            config.argon2_memory_kib,
            config.argon2_iterations,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| AppError::configuration(format!("Invalid Argon2 parameters: {e}")))?;

        let mut hasher = Self {
            params,
            dummy_hash: String::new(),
        };
        hasher.dummy_hash = hasher.hash_password("homelist-dummy-password")?;
        Ok(hasher)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hashes a plaintext password with a random salt into a PHC string.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                AppError::new(ErrorKind::Internal, format!("Password hashing failed: {e}"))
            })?;
        Ok(hash.to_string())
    }

    /// Verifies a password against a stored hash. Never fails; a malformed
    /// hash is logged and treated as a mismatch.
    pub fn verify_password(&self, password: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Stored password hash is malformed");
                return false;
            }
        };
        self.argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Checks a password against an optional stored hash.
    ///
    /// Accounts without a hash never match, but still pay for one verification.
    pub fn check(&self, password: &str, hash: Option<&str>) -> bool {
        match hash {
            Some(hash) => self.verify_password(password, hash),
            None => {
                let _ = self.verify_password(password, &self.dummy_hash);
                false
            }
        }
    }
}
