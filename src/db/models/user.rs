//! User account model

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::serde_helpers;
use crate::auth::Role;

/// Notification channel opt-ins
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NotificationPreferences {
    pub email: bool,
    pub sms: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email: true,
            sms: false,
        }
    }
}

/// User account
///
/// `password` holds the argon2 hash, never the plaintext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub notification_preferences: NotificationPreferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Hash a plaintext password with a fresh random salt
    pub fn hash_password(plain: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        Ok(Argon2::default()
            .hash_password(plain.as_bytes(), &salt)?
            .to_string())
    }

    /// Verify a plaintext password against the stored hash
    pub fn verify_password(&self, plain: &str) -> Result<bool, argon2::password_hash::Error> {
        let parsed = PasswordHash::new(&self.password)?;
        Ok(Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }

    /// String form of the record id
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|id| id.to_string()).unwrap_or_default()
    }
}

/// User view returned by the API (no password hash)
#[derive(Debug, Clone, Serialize)]
pub struct UserPublic {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub notification_preferences: NotificationPreferences,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        Self {
            id: user.id_string(),
            name: user.name,
            email: user.email,
            role: user.role,
            notification_preferences: user.notification_preferences,
            created_at: user.created_at,
        }
    }
}

fn default_role() -> Role {
    Role::Customer
}

/// POST /api/auth/signup
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

/// POST /api/auth/signin
#[derive(Debug, Deserialize, Validate)]
pub struct SigninRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// PUT /api/users/{id}
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_preferences: Option<NotificationPreferences>,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}
