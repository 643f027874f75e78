//! Quotation API handlers

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
use crate::db::models::{Quotation, QuotationCreate, QuotationStatus, QuotationUpdate};
use crate::db::repository::quotation::QuotationFilter;
use crate::db::repository::{QuotationRepository, SequenceRepository, record_key};
use crate::money::totals::recalculate_totals;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<QuotationStatus>,
    pub customer: Option<String>,
}

/// GET /api/quotations
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<Quotation>>> {
    let params = PageParams::new(query.page, query.limit);
    let filter = QuotationFilter {
        status: query.status,
        customer: query.customer,
    };
    let repo = QuotationRepository::new(state.db.clone());
    let (quotations, total) = repo.find_page(filter, params).await?;
    Ok(Json(Page::new(quotations, total, params)))
}

/// GET /api/quotations/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Quotation>> {
    let repo = QuotationRepository::new(state.db.clone());
    let quotation = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Quotation {}", id)))?;
    Ok(Json(quotation))
}

/// POST /api/quotations
pub async fn create(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<QuotationCreate>,
) -> AppResult<Json<Quotation>> {
    payload.validate()?;

    let sequences = SequenceRepository::new(state.db.clone());
    let quote_number = sequences.next_quote_number().await?;

    let mut items = payload.items;
    let totals = recalculate_totals(&mut items);

    let now = Utc::now();
    let quotation = Quotation {
        id: None,
        quote_number,
        customer: payload
            .customer
            .map(|id| RecordId::from_table_key("customer", record_key("customer", &id))),
        opportunity: payload
            .opportunity
            .map(|id| RecordId::from_table_key("opportunity", record_key("opportunity", &id))),
        status: payload.status,
        items,
        subtotal: totals.subtotal,
        discount_total: totals.discount_total,
        tax_total: totals.tax_total,
        total_amount: totals.total,
        valid_until: payload.valid_until,
        notes: payload.notes,
        created_by: Some(RecordId::from_table_key(
            "user",
            record_key("user", &current.id),
        )),
        created_at: now,
        updated_at: now,
    };

    let repo = QuotationRepository::new(state.db.clone());
    let created = repo.create(quotation).await?;
    Ok(Json(created))
}

/// PUT /api/quotations/{id}
///
/// Only open (draft/sent) quotations may be edited; item edits recompute
/// the totals.
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<QuotationUpdate>,
) -> AppResult<Json<Quotation>> {
    payload.validate()?;

    let repo = QuotationRepository::new(state.db.clone());
    let mut quotation = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Quotation {}", id)))?;

    if !quotation.status.is_open() {
        return Err(AppError::business_rule(
            "Only draft or sent quotations can be edited",
        ));
    }

    if let Some(status) = payload.status {
        quotation.status = status;
    }
    if let Some(valid_until) = payload.valid_until {
        quotation.valid_until = Some(valid_until);
    }
    if let Some(notes) = payload.notes {
        quotation.notes = Some(notes);
    }
    if let Some(mut items) = payload.items {
        let totals = recalculate_totals(&mut items);
        quotation.items = items;
        quotation.subtotal = totals.subtotal;
        quotation.discount_total = totals.discount_total;
        quotation.tax_total = totals.tax_total;
        quotation.total_amount = totals.total;
    }
    quotation.updated_at = Utc::now();

    let updated = repo
        .replace(&id, quotation)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Quotation {}", id)))?;
    Ok(Json(updated))
}

/// PUT /api/quotations/{id}/accept
///
/// Conditional flip from draft/sent; anything else is a business rule
/// failure, not a lost update.
pub async fn accept(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Quotation>> {
    let repo = QuotationRepository::new(state.db.clone());
    let accepted = repo.decide(&id, QuotationStatus::Accepted).await?;

    match accepted {
        Some(quotation) => Ok(Json(quotation)),
        None => {
            if repo.find_by_id(&id).await?.is_some() {
                Err(AppError::business_rule(
                    "Only draft or sent quotations can be accepted",
                ))
            } else {
                Err(AppError::not_found(format!("Quotation {}", id)))
            }
        }
    }
}

/// DELETE /api/quotations/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = QuotationRepository::new(state.db.clone());
    repo.delete(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Quotation {}", id)))?;
    Ok(Json(true))
}
