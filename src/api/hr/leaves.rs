//! Leave request handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde::Deserialize;
use surrealdb::RecordId;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::common::{AppError, AppResult, Page, PageParams};
use crate::core::ServerState;
use crate::db::models::{LeaveRequest, LeaveRequestCreate, LeaveStatus, LeaveStatusUpdate};
use crate::db::repository::leave_request::LeaveFilter;
use crate::db::repository::{LeaveRequestRepository, record_key};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub employee: Option<String>,
    pub status: Option<LeaveStatus>,
}

/// GET /api/hr/leaves
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<LeaveRequest>>> {
    let params = PageParams::new(query.page, query.limit);
    let filter = LeaveFilter {
        employee: query.employee,
        status: query.status,
    };
    let repo = LeaveRequestRepository::new(state.db.clone());
    let (requests, total) = repo.find_page(filter, params).await?;
    Ok(Json(Page::new(requests, total, params)))
}

/// GET /api/hr/leaves/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<LeaveRequest>> {
    let repo = LeaveRequestRepository::new(state.db.clone());
    let request = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Leave request {}", id)))?;
    Ok(Json(request))
}

/// POST /api/hr/leaves
///
/// `days` is the inclusive span of the date range.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<LeaveRequestCreate>,
) -> AppResult<Json<LeaveRequest>> {
    payload.validate()?;

    if payload.end_date < payload.start_date {
        return Err(AppError::invalid("end_date must not be before start_date"));
    }
    let days = (payload.end_date - payload.start_date).num_days() + 1;

    let now = Utc::now();
    let request = LeaveRequest {
        id: None,
        employee: RecordId::from_table_key("employee", record_key("employee", &payload.employee)),
        leave_type: payload.leave_type,
        start_date: payload.start_date,
        end_date: payload.end_date,
        days,
        reason: payload.reason,
        status: LeaveStatus::Pending,
        approved_by: None,
        approved_date: None,
        created_at: now,
        updated_at: now,
    };

    let repo = LeaveRequestRepository::new(state.db.clone());
    let created = repo.create(request).await?;
    Ok(Json(created))
}

/// PUT /api/hr/leaves/{id}/status
///
/// Approve or reject a pending request. The conditional update loses to
/// nothing: a request that is no longer pending stays as it is.
pub async fn decide(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<LeaveStatusUpdate>,
) -> AppResult<Json<LeaveRequest>> {
    if !matches!(
        payload.status,
        LeaveStatus::Approved | LeaveStatus::Rejected
    ) {
        return Err(AppError::invalid(
            "Status must be 'approved' or 'rejected'",
        ));
    }

    let repo = LeaveRequestRepository::new(state.db.clone());
    let decided = repo.decide(&id, payload.status, &current.id).await?;

    match decided {
        Some(request) => Ok(Json(request)),
        None => {
            if repo.find_by_id(&id).await?.is_some() {
                Err(AppError::business_rule(
                    "Only pending leave requests can be decided",
                ))
            } else {
                Err(AppError::not_found(format!("Leave request {}", id)))
            }
        }
    }
}

/// DELETE /api/hr/leaves/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = LeaveRequestRepository::new(state.db.clone());
    repo.delete(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Leave request {}", id)))?;
    Ok(Json(true))
}
