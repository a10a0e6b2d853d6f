//! User record.

use chrono::{DateTime, Utc};
use homelist_core::types::UserId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use super::provider::AuthProvider;

/// Free-form per-user preference map.
pub type Preferences = serde_json::Map<String, Value>;

/// Preferences given to every new account.
pub fn default_preferences() -> Preferences {
    let mut prefs = Preferences::new();
    prefs.insert("theme".to_string(), Value::from("light"));
    prefs.insert("language".to_string(), Value::from("en"));
    prefs
}

/// Trim and lower-case an email or username so uniqueness is case-insensitive.
pub fn normalize_handle(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Lower-cased, globally unique email.
    pub email: String,
    /// Lower-cased, globally unique handle.
    pub username: String,
    /// Argon2 PHC string; absent for federated-only accounts.
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    /// Provider the account was created through.
    pub provider: AuthProvider,
    /// Stable subject id from the federated identity provider.
    #[serde(skip_serializing, default)]
    pub external_id: Option<String>,
    /// Display name.
    pub name: String,
    /// Opaque photo URL.
    pub photo: Option<String>,
    /// UI preferences.
    #[sqlx(json)]
    pub preferences: Preferences,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the account can sign in with a password at all.
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Whether a federated identity is linked to this account.
    pub fn is_linked(&self) -> bool {
        self.external_id.is_some()
    }

    /// Apply a profile update in place.
    pub fn apply(&mut self, update: &ProfileUpdate, now: DateTime<Utc>) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(photo) = &update.photo {
            self.photo = Some(photo.clone());
        }
        if let Some(prefs) = &update.preferences {
            for (key, value) in prefs {
                self.preferences.insert(key.clone(), value.clone());
            }
        }
        self.updated_at = now;
    }
}

/// Data required to create a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: Option<String>,
    pub provider: AuthProvider,
    pub external_id: Option<String>,
    pub name: String,
    pub photo: Option<String>,
}

impl NewUser {
    /// A password account.
    pub fn local(email: &str, username: &str, password_hash: String, name: &str) -> Self {
        Self {
            email: normalize_handle(email),
            username: normalize_handle(username),
            password_hash: Some(password_hash),
            provider: AuthProvider::Local,
            external_id: None,
            name: name.trim().to_string(),
            photo: None,
        }
    }

    /// A federated account with no password.
    pub fn federated(
        provider: AuthProvider,
        email: &str,
        username: &str,
        external_id: &str,
        name: &str,
        photo: Option<String>,
    ) -> Self {
        Self {
            email: normalize_handle(email),
            username: normalize_handle(username),
            password_hash: None,
            provider,
            external_id: Some(external_id.to_string()),
            name: name.trim().to_string(),
            photo,
        }
    }

    /// Materialise the record with a fresh id, default preferences and timestamps.
    pub fn into_user(self, now: DateTime<Utc>) -> User {
        User {
            id: UserId::new(),
            email: self.email,
            username: self.username,
            password_hash: self.password_hash,
            provider: self.provider,
            external_id: self.external_id,
            name: self.name,
            photo: self.photo,
            preferences: default_preferences(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial profile update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub photo: Option<String>,
    /// Keys merged into the stored preference map.
    pub preferences: Option<Preferences>,
}

impl ProfileUpdate {
    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.photo.is_none() && self.preferences.is_none()
    }
}

/// Public identity of a user, as shown next to something they sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}
