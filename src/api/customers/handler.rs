//! Customer API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use crate::common::{AppError, AppResult, Page, PageParams};
use crate::core::ServerState;
use crate::db::models::{Customer, CustomerCreate, CustomerStatus, CustomerUpdate};
use crate::db::repository::customer::CustomerFilter;
use crate::db::repository::{CustomerRepository, record_key};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<CustomerStatus>,
    pub search: Option<String>,
}

/// GET /api/customers
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<Customer>>> {
    let params = PageParams::new(query.page, query.limit);
    let filter = CustomerFilter {
        status: query.status,
        search: query.search,
    };
    let repo = CustomerRepository::new(state.db.clone());
    let (customers, total) = repo.find_page(filter, params).await?;
    Ok(Json(Page::new(customers, total, params)))
}

/// GET /api/customers/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Customer>> {
    let repo = CustomerRepository::new(state.db.clone());
    let customer = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Customer {}", id)))?;
    Ok(Json(customer))
}

/// POST /api/customers
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CustomerCreate>,
) -> AppResult<Json<Customer>> {
    payload.validate()?;

    let now = Utc::now();
    let customer = Customer {
        id: None,
        user: None,
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        company: payload.company,
        customer_type: payload.customer_type,
        status: payload.status,
        address: payload.address,
        notes: payload.notes,
        assigned_to: payload
            .assigned_to
            .map(|id| RecordId::from_table_key("user", record_key("user", &id))),
        created_at: now,
        updated_at: now,
    };

    let repo = CustomerRepository::new(state.db.clone());
    let created = repo.create(customer).await.map_err(|e| match e {
        crate::db::repository::RepoError::Duplicate(_) => {
            AppError::conflict("A customer with this email already exists")
        }
        other => other.into(),
    })?;
    Ok(Json(created))
}

/// PUT /api/customers/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<CustomerUpdate>,
) -> AppResult<Json<Customer>> {
    payload.validate()?;
    let repo = CustomerRepository::new(state.db.clone());
    let customer = repo
        .update(&id, payload)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Customer {}", id)))?;
    Ok(Json(customer))
}

/// DELETE /api/customers/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = CustomerRepository::new(state.db.clone());
    repo.delete(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Customer {}", id)))?;
    Ok(Json(true))
}

/// Customer statistics: per-status counts, zero-filled
#[derive(Debug, Serialize)]
pub struct CustomerStatistics {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
    pub pending: u64,
}

/// GET /api/customers/statistics
pub async fn statistics(
    State(state): State<ServerState>,
) -> AppResult<Json<CustomerStatistics>> {
    let repo = CustomerRepository::new(state.db.clone());
    let rows = repo.count_by_status().await?;

    let mut stats = CustomerStatistics {
        total: 0,
        active: 0,
        inactive: 0,
        pending: 0,
    };
    for row in rows {
        stats.total += row.count;
        match row.status {
            CustomerStatus::Active => stats.active = row.count,
            CustomerStatus::Inactive => stats.inactive = row.count,
            CustomerStatus::Pending => stats.pending = row.count,
        }
    }
    Ok(Json(stats))
}
