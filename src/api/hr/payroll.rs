//! Payroll handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use surrealdb::RecordId;
use validator::Validate;

use crate::common::{AppError, AppResult, Page, PageParams};
use crate::core::ServerState;
use crate::db::models::{Payroll, PayrollCreate, PayrollStatus, PayrollUpdate};
use crate::db::repository::payroll::PayrollFilter;
use crate::db::repository::{PayrollRepository, record_key};
use crate::money::{to_decimal, to_f64};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub employee: Option<String>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

/// GET /api/hr/payroll
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<Payroll>>> {
    let params = PageParams::new(query.page, query.limit);
    let filter = PayrollFilter {
        employee: query.employee,
        month: query.month,
        year: query.year,
    };
    let repo = PayrollRepository::new(state.db.clone());
    let (payrolls, total) = repo.find_page(filter, params).await?;
    Ok(Json(Page::new(payrolls, total, params)))
}

/// GET /api/hr/payroll/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Payroll>> {
    let repo = PayrollRepository::new(state.db.clone());
    let payroll = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Payroll entry {}", id)))?;
    Ok(Json(payroll))
}

/// POST /api/hr/payroll
///
/// Overtime amount and net salary are derived here; net salary is floored
/// at zero when deductions exceed earnings.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<PayrollCreate>,
) -> AppResult<Json<Payroll>> {
    payload.validate()?;

    let overtime = to_decimal(payload.overtime_hours) * to_decimal(payload.overtime_rate);
    let net = (to_decimal(payload.basic_salary) + to_decimal(payload.allowances) + overtime
        - to_decimal(payload.deductions))
    .max(Decimal::ZERO);
    let overtime_amount = to_f64(overtime);
    let net_salary = to_f64(net);

    let now = Utc::now();
    let payroll = Payroll {
        id: None,
        employee: RecordId::from_table_key("employee", record_key("employee", &payload.employee)),
        month: payload.month,
        year: payload.year,
        basic_salary: payload.basic_salary,
        allowances: payload.allowances,
        deductions: payload.deductions,
        overtime_hours: payload.overtime_hours,
        overtime_rate: payload.overtime_rate,
        overtime_amount,
        net_salary,
        status: PayrollStatus::Draft,
        payment_date: None,
        created_at: now,
        updated_at: now,
    };

    let repo = PayrollRepository::new(state.db.clone());
    let created = repo.create(payroll).await.map_err(|e| match e {
        crate::db::repository::RepoError::Duplicate(_) => {
            AppError::conflict("A payroll entry for this employee and period already exists")
        }
        other => other.into(),
    })?;
    Ok(Json(created))
}

/// PUT /api/hr/payroll/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<PayrollUpdate>,
) -> AppResult<Json<Payroll>> {
    payload.validate()?;
    let repo = PayrollRepository::new(state.db.clone());
    let payroll = repo
        .update(&id, payload)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Payroll entry {}", id)))?;
    Ok(Json(payroll))
}

/// DELETE /api/hr/payroll/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = PayrollRepository::new(state.db.clone());
    repo.delete(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Payroll entry {}", id)))?;
    Ok(Json(true))
}
