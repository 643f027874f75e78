//! Opportunity API handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::common::{AppError, AppResult, Page, PageParams};
use crate::core::ServerState;
use crate::db::models::{
    Activity, ActivityCreate, LineItem, Opportunity, OpportunityCreate, OpportunityStage,
    OpportunityUpdate, SalesOrder, SalesOrderStatus,
};
use crate::db::repository::opportunity::OpportunityFilter;
use crate::db::repository::{
    OpportunityRepository, SalesOrderRepository, SequenceRepository, record_key,
};
use crate::money::totals::recalculate_totals;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub stage: Option<OpportunityStage>,
    pub customer: Option<String>,
}

/// GET /api/sales/opportunities
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<Opportunity>>> {
    let params = PageParams::new(query.page, query.limit);
    let filter = OpportunityFilter {
        stage: query.stage,
        customer: query.customer,
    };
    let repo = OpportunityRepository::new(state.db.clone());
    let (opportunities, total) = repo.find_page(filter, params).await?;
    Ok(Json(Page::new(opportunities, total, params)))
}

/// GET /api/sales/opportunities/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Opportunity>> {
    let repo = OpportunityRepository::new(state.db.clone());
    let opportunity = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Opportunity {}", id)))?;
    Ok(Json(opportunity))
}

/// POST /api/sales/opportunities
pub async fn create(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<OpportunityCreate>,
) -> AppResult<Json<Opportunity>> {
    payload.validate()?;

    let stage = Opportunity::apply_probability_rules(payload.stage, payload.probability);
    let closed = matches!(
        stage,
        OpportunityStage::ClosedWon | OpportunityStage::ClosedLost
    );

    let now = Utc::now();
    let opportunity = Opportunity {
        id: None,
        name: payload.name,
        customer: payload
            .customer
            .map(|id| RecordId::from_table_key("customer", record_key("customer", &id))),
        stage,
        amount: payload.amount,
        probability: payload.probability,
        expected_close_date: payload.expected_close_date,
        closed_date: closed.then_some(now),
        converted_to_order_id: None,
        items: payload.items,
        activities: Vec::new(),
        notes: payload.notes,
        assigned_to: payload
            .assigned_to
            .map(|id| RecordId::from_table_key("user", record_key("user", &id))),
        created_by: Some(RecordId::from_table_key(
            "user",
            record_key("user", &current.id),
        )),
        created_at: now,
        updated_at: now,
    };

    let repo = OpportunityRepository::new(state.db.clone());
    let created = repo.create(opportunity).await?;
    Ok(Json(created))
}

/// PUT /api/sales/opportunities/{id}
///
/// Probability and stage are re-coupled after applying the patch.
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(mut payload): Json<OpportunityUpdate>,
) -> AppResult<Json<Opportunity>> {
    payload.validate()?;

    let repo = OpportunityRepository::new(state.db.clone());

    if payload.stage.is_some() || payload.probability.is_some() {
        let existing = repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Opportunity {}", id)))?;
        let stage = payload.stage.unwrap_or(existing.stage);
        let probability = payload.probability.unwrap_or(existing.probability);
        payload.stage = Some(Opportunity::apply_probability_rules(stage, probability));
    }

    let opportunity = repo
        .update(&id, payload)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Opportunity {}", id)))?;
    Ok(Json(opportunity))
}

/// DELETE /api/sales/opportunities/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = OpportunityRepository::new(state.db.clone());
    repo.delete(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Opportunity {}", id)))?;
    Ok(Json(true))
}

/// POST /api/sales/opportunities/{id}/activities
pub async fn add_activity(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<ActivityCreate>,
) -> AppResult<Json<Opportunity>> {
    payload.validate()?;

    let activity = Activity {
        activity_type: payload.activity_type,
        description: payload.description,
        created_by: Some(RecordId::from_table_key(
            "user",
            record_key("user", &current.id),
        )),
        created_at: Utc::now(),
    };

    let repo = OpportunityRepository::new(state.db.clone());
    let opportunity = repo
        .add_activity(&id, activity)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Opportunity {}", id)))?;
    Ok(Json(opportunity))
}

/// POST /api/sales/opportunities/{id}/convert-to-order
///
/// Requires a closed-won, not-yet-converted opportunity. The order number is
/// allocated from the atomic counter before the insert; the conditional
/// stamp afterwards guarantees at most one order per opportunity even under
/// racing converts (the loser's order is removed again).
pub async fn convert_to_order(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<SalesOrder>> {
    let opportunities = OpportunityRepository::new(state.db.clone());

    let opportunity = opportunities
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Opportunity {}", id)))?;

    if opportunity.stage != OpportunityStage::ClosedWon {
        return Err(AppError::business_rule(
            "Only closed-won opportunities can be converted to an order",
        ));
    }
    if opportunity.converted_to_order_id.is_some() {
        return Err(AppError::business_rule(
            "Opportunity has already been converted",
        ));
    }
    if opportunity.items.is_empty() {
        return Err(AppError::business_rule(
            "Opportunity has no items to convert",
        ));
    }

    let sequences = SequenceRepository::new(state.db.clone());
    let order_number = sequences.next_order_number().await?;

    let mut items: Vec<LineItem> = opportunity
        .items
        .iter()
        .map(|item| LineItem {
            product: item.product.clone(),
            description: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            discount: 0.0,
            tax: 0.0,
            total: 0.0,
        })
        .collect();
    let totals = recalculate_totals(&mut items);

    let now = Utc::now();
    let order = SalesOrder {
        id: None,
        order_number,
        customer: opportunity.customer.clone(),
        opportunity: opportunity.id.clone(),
        status: SalesOrderStatus::Pending,
        items,
        subtotal: totals.subtotal,
        discount_total: totals.discount_total,
        tax_total: totals.tax_total,
        total_amount: totals.total,
        order_date: now,
        delivery_date: None,
        notes: opportunity.notes.clone(),
        created_by: Some(RecordId::from_table_key(
            "user",
            record_key("user", &current.id),
        )),
        created_at: now,
        updated_at: now,
    };

    let orders = SalesOrderRepository::new(state.db.clone());
    let order = orders.create(order).await?;
    let order_id = order
        .id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_default();

    let stamped = opportunities.mark_converted(&id, &order_id).await?;
    if stamped.is_none() {
        // Lost the race; this conversion's order must not survive
        if let Err(e) = orders.delete(&order_id).await {
            tracing::error!(order = %order_id, error = %e, "failed to remove orphaned order");
        }
        return Err(AppError::business_rule(
            "Opportunity has already been converted",
        ));
    }

    Ok(Json(order))
}

/// Per-stage rollup, zero-filled across all stages
#[derive(Debug, Serialize)]
pub struct StageBucket {
    pub stage: OpportunityStage,
    pub count: u64,
    pub total_value: f64,
}

#[derive(Debug, Serialize)]
pub struct OpportunityStatistics {
    pub total: u64,
    pub total_value: f64,
    pub by_stage: Vec<StageBucket>,
}

const ALL_STAGES: [OpportunityStage; 6] = [
    OpportunityStage::Prospecting,
    OpportunityStage::Qualification,
    OpportunityStage::Proposal,
    OpportunityStage::Negotiation,
    OpportunityStage::ClosedWon,
    OpportunityStage::ClosedLost,
];

/// GET /api/sales/opportunities/statistics
pub async fn statistics(
    State(state): State<ServerState>,
) -> AppResult<Json<OpportunityStatistics>> {
    let repo = OpportunityRepository::new(state.db.clone());
    let rows = repo.stats_by_stage().await?;

    let mut by_stage: Vec<StageBucket> = ALL_STAGES
        .iter()
        .map(|stage| StageBucket {
            stage: *stage,
            count: 0,
            total_value: 0.0,
        })
        .collect();

    let mut total = 0;
    let mut total_value = 0.0;
    for row in rows {
        total += row.count;
        total_value += row.total_value;
        if let Some(bucket) = by_stage.iter_mut().find(|b| b.stage == row.stage) {
            bucket.count = row.count;
            bucket.total_value = row.total_value;
        }
    }

    Ok(Json(OpportunityStatistics {
        total,
        total_value,
        by_stage,
    }))
}
