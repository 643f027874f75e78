//! Department handlers

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde::Serialize;
use surrealdb::RecordId;
use validator::Validate;

use crate::common::{AppError, AppResult};
use crate::core::ServerState;
use crate::db::models::{Department, DepartmentCreate, DepartmentUpdate};
use crate::db::repository::{DepartmentRepository, EmployeeRepository, record_key};

/// Department with its current headcount
#[derive(Debug, Serialize)]
pub struct DepartmentView {
    #[serde(flatten)]
    pub department: Department,
    pub employee_count: u64,
}

/// GET /api/hr/departments
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<DepartmentView>>> {
    let departments = DepartmentRepository::new(state.db.clone()).find_all().await?;
    let (_, _, _, headcounts) = EmployeeRepository::new(state.db.clone())
        .statistics()
        .await?;

    let views = departments
        .into_iter()
        .map(|department| {
            let employee_count = headcounts
                .iter()
                .find(|h| h.department.as_deref() == Some(department.name.as_str()))
                .map(|h| h.count)
                .unwrap_or(0);
            DepartmentView {
                department,
                employee_count,
            }
        })
        .collect();
    Ok(Json(views))
}

/// GET /api/hr/departments/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Department>> {
    let repo = DepartmentRepository::new(state.db.clone());
    let department = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Department {}", id)))?;
    Ok(Json(department))
}

/// POST /api/hr/departments
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DepartmentCreate>,
) -> AppResult<Json<Department>> {
    payload.validate()?;

    let now = Utc::now();
    let department = Department {
        id: None,
        name: payload.name,
        code: payload.code,
        description: payload.description,
        manager: payload
            .manager
            .map(|id| RecordId::from_table_key("employee", record_key("employee", &id))),
        is_active: payload.is_active,
        created_at: now,
        updated_at: now,
    };

    let repo = DepartmentRepository::new(state.db.clone());
    let created = repo.create(department).await.map_err(|e| match e {
        crate::db::repository::RepoError::Duplicate(_) => {
            AppError::conflict("A department with this code already exists")
        }
        other => other.into(),
    })?;
    Ok(Json(created))
}

/// PUT /api/hr/departments/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<DepartmentUpdate>,
) -> AppResult<Json<Department>> {
    payload.validate()?;
    let repo = DepartmentRepository::new(state.db.clone());
    let department = repo
        .update(&id, payload)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Department {}", id)))?;
    Ok(Json(department))
}

/// DELETE /api/hr/departments/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = DepartmentRepository::new(state.db.clone());
    repo.delete(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Department {}", id)))?;
    Ok(Json(true))
}
