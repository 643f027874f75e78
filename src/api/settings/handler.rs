//! Account settings handlers
//!
//! Every operation targets the authenticated user's own record; the role
//! field is deliberately out of reach here.

use axum::{Extension, Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::common::{AppError, AppResult};
use crate::core::ServerState;
use crate::db::models::{NotificationPreferences, User, UserPublic, UserUpdate};
use crate::db::repository::UserRepository;
use crate::security_log;

/// GET /api/settings/profile
pub async fn profile(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<UserPublic>> {
    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .find_by_id(&current.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {}", current.id)))?;
    Ok(Json(user.into()))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

/// PUT /api/settings/profile
pub async fn update_profile(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<ProfileUpdate>,
) -> AppResult<Json<UserPublic>> {
    payload.validate()?;

    let patch = UserUpdate {
        name: payload.name,
        email: payload.email,
        role: None,
        notification_preferences: None,
        updated_at: None,
    };
    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .update(&current.id, patch)
        .await
        .map_err(|e| match e {
            crate::db::repository::RepoError::Duplicate(_) => {
                AppError::conflict("Email already in use")
            }
            other => other.into(),
        })?
        .ok_or_else(|| AppError::not_found(format!("User {}", current.id)))?;
    Ok(Json(user.into()))
}

/// PUT /api/settings/notifications
pub async fn update_notifications(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(preferences): Json<NotificationPreferences>,
) -> AppResult<Json<UserPublic>> {
    let patch = UserUpdate {
        name: None,
        email: None,
        role: None,
        notification_preferences: Some(preferences),
        updated_at: None,
    };
    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .update(&current.id, patch)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {}", current.id)))?;
    Ok(Json(user.into()))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 6, max = 128))]
    pub new_password: String,
}

/// PUT /api/settings/password
///
/// The current password must verify before the hash is swapped.
pub async fn change_password(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<Json<Value>> {
    payload.validate()?;

    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .find_by_id(&current.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {}", current.id)))?;

    let verified = user.verify_password(&payload.current_password).unwrap_or(false);
    if !verified {
        security_log!("WARN", "password_change_bad_credential", user_id = current.id.clone());
        return Err(AppError::InvalidCredentials);
    }

    let hash = User::hash_password(&payload.new_password)
        .map_err(|e| AppError::internal(format!("password hash failed: {e}")))?;
    repo.set_password(&current.id, hash)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {}", current.id)))?;

    security_log!("INFO", "password_changed", user_id = current.id.clone());
    Ok(Json(json!({ "message": "Password updated" })))
}
