//! Sales order API handlers

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
use crate::db::models::{SalesOrder, SalesOrderCreate, SalesOrderStatus, SalesOrderUpdate};
use crate::db::repository::sales_order::SalesOrderFilter;
use crate::db::repository::{SalesOrderRepository, SequenceRepository, record_key};
use crate::money::totals::recalculate_totals;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<SalesOrderStatus>,
    pub customer: Option<String>,
}

/// GET /api/sales/orders
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<SalesOrder>>> {
    let params = PageParams::new(query.page, query.limit);
    let filter = SalesOrderFilter {
        status: query.status,
        customer: query.customer,
    };
    let repo = SalesOrderRepository::new(state.db.clone());
    let (orders, total) = repo.find_page(filter, params).await?;
    Ok(Json(Page::new(orders, total, params)))
}

/// GET /api/sales/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<SalesOrder>> {
    let repo = SalesOrderRepository::new(state.db.clone());
    let order = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Sales order {}", id)))?;
    Ok(Json(order))
}

/// POST /api/sales/orders
///
/// Totals are recomputed server-side; the order number comes from the
/// atomic counter.
pub async fn create(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<SalesOrderCreate>,
) -> AppResult<Json<SalesOrder>> {
    payload.validate()?;

    let sequences = SequenceRepository::new(state.db.clone());
    let order_number = sequences.next_order_number().await?;

    let mut items = payload.items;
    let totals = recalculate_totals(&mut items);

    let now = Utc::now();
    let order = SalesOrder {
        id: None,
        order_number,
        customer: payload
            .customer
            .map(|id| RecordId::from_table_key("customer", record_key("customer", &id))),
        opportunity: None,
        status: payload.status,
        items,
        subtotal: totals.subtotal,
        discount_total: totals.discount_total,
        tax_total: totals.tax_total,
        total_amount: totals.total,
        order_date: payload.order_date.unwrap_or(now),
        delivery_date: payload.delivery_date,
        notes: payload.notes,
        created_by: Some(RecordId::from_table_key(
            "user",
            record_key("user", &current.id),
        )),
        created_at: now,
        updated_at: now,
    };

    let repo = SalesOrderRepository::new(state.db.clone());
    let created = repo.create(order).await?;
    Ok(Json(created))
}

/// PUT /api/sales/orders/{id}
///
/// Status, delivery date and notes only; items and totals are immutable
/// after creation. A cancelled order is terminal.
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<SalesOrderUpdate>,
) -> AppResult<Json<SalesOrder>> {
    let repo = SalesOrderRepository::new(state.db.clone());

    if payload.status.is_some() {
        let existing = repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Sales order {}", id)))?;
        if existing.status == SalesOrderStatus::Cancelled {
            return Err(AppError::business_rule("Cancelled orders cannot change status"));
        }
    }

    let order = repo
        .update(&id, payload)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Sales order {}", id)))?;
    Ok(Json(order))
}

/// DELETE /api/sales/orders/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = SalesOrderRepository::new(state.db.clone());
    repo.delete(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Sales order {}", id)))?;
    Ok(Json(true))
}
