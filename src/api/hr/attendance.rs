//! Attendance handlers
//!
//! One record per employee per day: clock-in creates it, clock-out closes
//! it and derives the worked hours.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use surrealdb::RecordId;
use validator::Validate;

use crate::common::{AppError, AppResult, Page, PageParams};
use crate::core::ServerState;
use crate::db::models::{
    Attendance, AttendanceCreate, AttendanceUpdate, CheckDirection, CheckRequest,
};
use crate::db::repository::attendance::AttendanceFilter;
use crate::db::repository::{AttendanceRepository, record_key};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub employee: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// GET /api/hr/attendance
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<Attendance>>> {
    let params = PageParams::new(query.page, query.limit);
    let filter = AttendanceFilter {
        employee: query.employee,
        from: query.from,
        to: query.to,
    };
    let repo = AttendanceRepository::new(state.db.clone());
    let (records, total) = repo.find_page(filter, params).await?;
    Ok(Json(Page::new(records, total, params)))
}

/// POST /api/hr/attendance
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<AttendanceCreate>,
) -> AppResult<Json<Attendance>> {
    payload.validate()?;

    let repo = AttendanceRepository::new(state.db.clone());
    if repo
        .find_for_day(&payload.employee, payload.date)
        .await?
        .is_some()
    {
        return Err(AppError::conflict(
            "An attendance record already exists for this employee and date",
        ));
    }

    let now = Utc::now();
    let attendance = Attendance {
        id: None,
        employee: RecordId::from_table_key("employee", record_key("employee", &payload.employee)),
        date: payload.date,
        check_in: payload.check_in,
        check_out: payload.check_out,
        total_hours: payload.total_hours,
        status: payload.status,
        created_at: now,
        updated_at: now,
    };
    let created = repo.create(attendance).await?;
    Ok(Json(created))
}

/// POST /api/hr/attendance/check
///
/// Clock in or out for today. Double clock-in and clock-out without a
/// prior clock-in are both rejected.
pub async fn check(
    State(state): State<ServerState>,
    Json(payload): Json<CheckRequest>,
) -> AppResult<Json<Attendance>> {
    payload.validate()?;

    let repo = AttendanceRepository::new(state.db.clone());
    let now = Utc::now();
    let today = now.date_naive();
    let existing = repo.find_for_day(&payload.employee, today).await?;

    match payload.direction {
        CheckDirection::In => {
            if existing.is_some() {
                return Err(AppError::invalid("Already checked in today"));
            }
            let attendance = Attendance {
                id: None,
                employee: RecordId::from_table_key(
                    "employee",
                    record_key("employee", &payload.employee),
                ),
                date: today,
                check_in: Some(now),
                check_out: None,
                total_hours: None,
                status: crate::db::models::AttendanceStatus::Present,
                created_at: now,
                updated_at: now,
            };
            let created = repo.create(attendance).await?;
            Ok(Json(created))
        }
        CheckDirection::Out => {
            let record = existing.ok_or_else(|| AppError::invalid("No check-in found for today"))?;
            if record.check_out.is_some() {
                return Err(AppError::invalid("Already checked out today"));
            }
            let check_in = record
                .check_in
                .ok_or_else(|| AppError::invalid("No check-in found for today"))?;

            let worked = now.signed_duration_since(check_in);
            let total_hours = ((worked.num_seconds() as f64 / 3600.0) * 100.0).round() / 100.0;

            let key = record
                .id
                .as_ref()
                .map(|id| id.key().to_string())
                .ok_or_else(|| AppError::database("attendance record has no id"))?;
            let closed = repo
                .close(&key, now, total_hours)
                .await?
                .ok_or_else(|| AppError::not_found("Attendance record"))?;
            Ok(Json(closed))
        }
    }
}

/// PUT /api/hr/attendance/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<AttendanceUpdate>,
) -> AppResult<Json<Attendance>> {
    let repo = AttendanceRepository::new(state.db.clone());
    let record = repo
        .update(&id, payload)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Attendance record {}", id)))?;
    Ok(Json(record))
}

/// DELETE /api/hr/attendance/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = AttendanceRepository::new(state.db.clone());
    repo.delete(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Attendance record {}", id)))?;
    Ok(Json(true))
}
