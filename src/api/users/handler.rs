//! User administration handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use validator::Validate;

use crate::auth::Role;
use crate::common::{AppError, AppResult, Page, PageParams};
use crate::core::ServerState;
use crate::db::models::{UserPublic, UserUpdate};
use crate::db::repository::UserRepository;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// GET /api/users
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<UserPublic>>> {
    let params = PageParams::new(query.page, query.limit);
    let repo = UserRepository::new(state.db.clone());
    let (users, total) = repo.find_page(params).await?;
    let users: Vec<UserPublic> = users.into_iter().map(Into::into).collect();
    Ok(Json(Page::new(users, total, params)))
}

/// GET /api/users/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<UserPublic>> {
    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {}", id)))?;
    Ok(Json(user.into()))
}

/// PUT /api/users/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<UserPublic>> {
    payload.validate()?;
    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .update(&id, payload)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {}", id)))?;
    Ok(Json(user.into()))
}

#[derive(Debug, Deserialize)]
pub struct RoleUpdate {
    pub role: Role,
}

/// PUT /api/users/{id}/role
pub async fn set_role(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<RoleUpdate>,
) -> AppResult<Json<UserPublic>> {
    let patch = UserUpdate {
        name: None,
        email: None,
        role: Some(payload.role),
        notification_preferences: None,
        updated_at: None,
    };
    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .update(&id, patch)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {}", id)))?;
    Ok(Json(user.into()))
}

/// DELETE /api/users/{id}
///
/// A customer-role user takes its linked customer document with it.
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = UserRepository::new(state.db.clone());
    repo.delete_with_cascade(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {}", id)))?;
    Ok(Json(true))
}
