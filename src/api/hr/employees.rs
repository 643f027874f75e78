//! Employee handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use crate::auth::Role;
use crate::common::{AppError, AppResult, Page, PageParams};
use crate::core::ServerState;
use crate::db::models::{Employee, EmployeeCreate, EmployeeStatus, EmployeeUpdate, User};
use crate::db::repository::employee::{DepartmentHeadcount, EmployeeFilter, new_user_key};
use crate::db::repository::{EmployeeRepository, SequenceRepository, record_key};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<EmployeeStatus>,
    pub department: Option<String>,
    pub search: Option<String>,
}

/// GET /api/hr/employees
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<Employee>>> {
    let params = PageParams::new(query.page, query.limit);
    let filter = EmployeeFilter {
        status: query.status,
        department: query.department,
        search: query.search,
    };
    let repo = EmployeeRepository::new(state.db.clone());
    let (employees, total) = repo.find_page(filter, params).await?;
    Ok(Json(Page::new(employees, total, params)))
}

/// GET /api/hr/employees/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Employee>> {
    let repo = EmployeeRepository::new(state.db.clone());
    let employee = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Employee {}", id)))?;
    Ok(Json(employee))
}

/// POST /api/hr/employees
///
/// With a password in the payload the login user is created in the same
/// transaction as the employee record.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<EmployeeCreate>,
) -> AppResult<Json<Employee>> {
    payload.validate()?;

    let sequences = SequenceRepository::new(state.db.clone());
    let employee_id = sequences.next_employee_id().await?;

    let now = Utc::now();
    let mut employee = Employee {
        id: None,
        employee_id,
        user: None,
        first_name: payload.first_name,
        last_name: payload.last_name,
        email: payload.email,
        phone: payload.phone,
        department: payload
            .department
            .map(|id| RecordId::from_table_key("department", record_key("department", &id))),
        designation: payload.designation,
        join_date: payload.join_date,
        salary: payload.salary,
        status: payload.status,
        created_at: now,
        updated_at: now,
    };

    let repo = EmployeeRepository::new(state.db.clone());
    let created = match payload.password {
        Some(password) => {
            let hash = User::hash_password(&password)
                .map_err(|e| AppError::internal(format!("password hash failed: {}", e)))?;
            let user = User {
                id: None,
                name: format!("{} {}", employee.first_name, employee.last_name),
                email: employee.email.clone(),
                password: hash,
                role: payload.user_role.unwrap_or(Role::Support),
                notification_preferences: Default::default(),
                created_at: now,
                updated_at: now,
            };
            let user_key = new_user_key();
            employee.user = Some(RecordId::from_table_key("user", user_key.clone()));
            repo.create_with_user(user_key, user, employee).await
        }
        None => repo.create(employee).await,
    }
    .map_err(|e| match e {
        crate::db::repository::RepoError::Duplicate(_) => {
            AppError::conflict("An employee with this email already exists")
        }
        other => other.into(),
    })?;

    Ok(Json(created))
}

/// PUT /api/hr/employees/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<EmployeeUpdate>,
) -> AppResult<Json<Employee>> {
    payload.validate()?;
    let repo = EmployeeRepository::new(state.db.clone());
    let employee = repo
        .update(&id, payload)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Employee {}", id)))?;
    Ok(Json(employee))
}

/// DELETE /api/hr/employees/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = EmployeeRepository::new(state.db.clone());
    repo.delete(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Employee {}", id)))?;
    Ok(Json(true))
}

#[derive(Debug, Serialize)]
pub struct HrStatistics {
    pub total: u64,
    pub active: u64,
    pub on_leave: u64,
    pub by_department: Vec<DepartmentHeadcount>,
}

/// GET /api/hr/employees/stats
pub async fn stats(State(state): State<ServerState>) -> AppResult<Json<HrStatistics>> {
    let repo = EmployeeRepository::new(state.db.clone());
    let (total, active, on_leave, by_department) = repo.statistics().await?;
    Ok(Json(HrStatistics {
        total,
        active,
        on_leave,
        by_department,
    }))
}
