//! Auth API handlers

use std::time::Duration;

use axum::{
    Extension, Json,
    extract::State,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::common::{AppError, AppResult};
use crate::core::ServerState;
use crate::db::models::{SigninRequest, SignupRequest, User, UserPublic};
use crate::db::repository::UserRepository;
use crate::security_log;

/// Minimum wall time for a signin attempt. Failures take as long as
/// successes so response timing does not reveal whether the email exists.
const SIGNIN_MIN_DURATION: Duration = Duration::from_millis(500);

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserPublic,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub token: String,
}

/// POST /api/auth/signup - register a new account
pub async fn signup(
    State(state): State<ServerState>,
    Json(payload): Json<SignupRequest>,
) -> AppResult<Json<AuthResponse>> {
    payload.validate()?;

    let repo = UserRepository::new(state.db.clone());

    let now = Utc::now();
    let user = User {
        id: None,
        name: payload.name,
        email: payload.email,
        password: User::hash_password(&payload.password)
            .map_err(|e| AppError::internal(format!("password hash failed: {e}")))?,
        role: payload.role,
        notification_preferences: Default::default(),
        created_at: now,
        updated_at: now,
    };

    let created = repo.create(user).await.map_err(|e| match e {
        crate::db::repository::RepoError::Duplicate(_) => {
            AppError::conflict("Email already in use")
        }
        other => other.into(),
    })?;

    let token = state
        .jwt_service
        .generate_token(
            &created.id_string(),
            &created.name,
            Some(&created.email),
            created.role,
        )
        .map_err(|e| AppError::internal(e.to_string()))?;

    Ok(Json(AuthResponse {
        token,
        user: created.into(),
    }))
}

/// POST /api/auth/signin - exchange credentials for a token
pub async fn signin(
    State(state): State<ServerState>,
    Json(payload): Json<SigninRequest>,
) -> AppResult<Json<AuthResponse>> {
    let started = tokio::time::Instant::now();
    let result = do_signin(&state, payload).await;
    tokio::time::sleep_until(started + SIGNIN_MIN_DURATION).await;
    result.map(Json)
}

async fn do_signin(state: &ServerState, payload: SigninRequest) -> AppResult<AuthResponse> {
    payload.validate().map_err(|_| AppError::InvalidCredentials)?;

    let repo = UserRepository::new(state.db.clone());
    let user = repo.find_by_email(&payload.email).await?;

    let Some(user) = user else {
        security_log!("WARN", "signin_unknown_email", email = payload.email.clone());
        return Err(AppError::InvalidCredentials);
    };

    let verified = user.verify_password(&payload.password).unwrap_or(false);
    if !verified {
        security_log!("WARN", "signin_bad_password", user_id = user.id_string());
        return Err(AppError::InvalidCredentials);
    }

    let token = state
        .jwt_service
        .generate_token(&user.id_string(), &user.name, Some(&user.email), user.role)
        .map_err(|e| AppError::internal(e.to_string()))?;

    Ok(AuthResponse {
        token,
        user: user.into(),
    })
}

/// POST /api/auth/refresh - re-issue a token
///
/// Accepts tokens expired less than the configured grace window ago. The
/// user record is re-read so a role change invalidates old claims.
pub async fn refresh(
    State(state): State<ServerState>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let claims = state
        .jwt_service
        .validate_for_refresh(&payload.token)
        .map_err(|e| match e {
            crate::auth::JwtError::ExpiredToken => AppError::TokenExpired,
            crate::auth::JwtError::InvalidPayload(_) => AppError::InvalidTokenPayload,
            _ => AppError::InvalidToken,
        })?;

    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .find_by_id(&claims.sub)
        .await?
        .ok_or(AppError::InvalidToken)?;

    let token = state
        .jwt_service
        .generate_token(&user.id_string(), &user.name, Some(&user.email), user.role)
        .map_err(|e| AppError::internal(e.to_string()))?;

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// GET /api/auth/me - the authenticated user's profile
pub async fn me(
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

/// POST /api/auth/signout
///
/// Tokens are stateless; the client discards its copy.
pub async fn signout(Extension(current): Extension<CurrentUser>) -> Json<Value> {
    security_log!("INFO", "signout", user_id = current.id.clone());
    Json(json!({ "message": "Signed out" }))
}
