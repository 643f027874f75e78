//! Lead API handlers

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
    Customer, CustomerStatus, CustomerType, Lead, LeadCreate, LeadSource, LeadStatus, LeadUpdate,
};
use crate::db::repository::lead::LeadFilter;
use crate::db::repository::{CustomerRepository, LeadRepository, record_key};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<LeadStatus>,
    pub source: Option<LeadSource>,
    pub search: Option<String>,
}

/// GET /api/leads
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<Lead>>> {
    let params = PageParams::new(query.page, query.limit);
    let filter = LeadFilter {
        status: query.status,
        source: query.source,
        search: query.search,
    };
    let repo = LeadRepository::new(state.db.clone());
    let (leads, total) = repo.find_page(filter, params).await?;
    Ok(Json(Page::new(leads, total, params)))
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// GET /api/leads/status/{status}
pub async fn list_by_status(
    State(state): State<ServerState>,
    Path(status): Path<LeadStatus>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<Lead>>> {
    let params = PageParams::new(query.page, query.limit);
    let filter = LeadFilter {
        status: Some(status),
        ..Default::default()
    };
    let repo = LeadRepository::new(state.db.clone());
    let (leads, total) = repo.find_page(filter, params).await?;
    Ok(Json(Page::new(leads, total, params)))
}

/// GET /api/leads/source/{source}
pub async fn list_by_source(
    State(state): State<ServerState>,
    Path(source): Path<LeadSource>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<Lead>>> {
    let params = PageParams::new(query.page, query.limit);
    let filter = LeadFilter {
        source: Some(source),
        ..Default::default()
    };
    let repo = LeadRepository::new(state.db.clone());
    let (leads, total) = repo.find_page(filter, params).await?;
    Ok(Json(Page::new(leads, total, params)))
}

/// GET /api/leads/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Lead>> {
    let repo = LeadRepository::new(state.db.clone());
    let lead = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Lead {}", id)))?;
    Ok(Json(lead))
}

/// POST /api/leads
pub async fn create(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<LeadCreate>,
) -> AppResult<Json<Lead>> {
    payload.validate()?;

    let now = Utc::now();
    let lead = Lead {
        id: None,
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        company: payload.company,
        source: payload.source,
        status: payload.status,
        estimated_value: payload.estimated_value,
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

    let repo = LeadRepository::new(state.db.clone());
    let created = repo.create(lead).await.map_err(|e| match e {
        crate::db::repository::RepoError::Duplicate(_) => {
            AppError::conflict("A lead with this email already exists")
        }
        other => other.into(),
    })?;
    Ok(Json(created))
}

/// PUT /api/leads/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<LeadUpdate>,
) -> AppResult<Json<Lead>> {
    payload.validate()?;
    let repo = LeadRepository::new(state.db.clone());
    let lead = repo
        .update(&id, payload)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Lead {}", id)))?;
    Ok(Json(lead))
}

/// DELETE /api/leads/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = LeadRepository::new(state.db.clone());
    repo.delete(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Lead {}", id)))?;
    Ok(Json(true))
}

/// Optional field overrides for the created customer
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ConvertRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub lead: Lead,
    pub customer: Customer,
}

/// PUT /api/leads/{id}/convert - turn a lead into a customer
///
/// The conditional status flip claims the lead first, so two racing
/// converts produce exactly one customer. The claim clears the lead's
/// assignment; the new customer inherits it instead. A failed customer
/// insert releases the claim.
pub async fn convert(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Option<Json<ConvertRequest>>,
) -> AppResult<Json<ConvertResponse>> {
    let overrides = payload.map(|Json(p)| p).unwrap_or_default();
    overrides.validate()?;

    let leads = LeadRepository::new(state.db.clone());

    let before = leads
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Lead {}", id)))?;
    if before.status == LeadStatus::Converted {
        return Err(AppError::business_rule("Lead is already converted"));
    }

    let lead = leads
        .claim_for_conversion(&id)
        .await?
        .ok_or_else(|| AppError::business_rule("Lead is already converted"))?;

    let now = Utc::now();
    let customer = Customer {
        id: None,
        user: None,
        name: overrides.name.unwrap_or_else(|| lead.name.clone()),
        email: overrides.email.unwrap_or_else(|| lead.email.clone()),
        phone: overrides.phone.or_else(|| lead.phone.clone()),
        company: overrides.company.or_else(|| lead.company.clone()),
        customer_type: if lead.company.is_some() {
            CustomerType::Business
        } else {
            CustomerType::Individual
        },
        status: CustomerStatus::Active,
        address: None,
        notes: overrides.notes.or_else(|| lead.notes.clone()),
        assigned_to: before.assigned_to.clone(),
        created_at: now,
        updated_at: now,
    };

    let customers = CustomerRepository::new(state.db.clone());
    match customers.create(customer).await {
        Ok(created) => Ok(Json(ConvertResponse {
            lead,
            customer: created,
        })),
        Err(e) => {
            // Release the claim so the lead can be converted again
            if let Err(rollback) = leads
                .release_conversion_claim(&id, before.status, before.assigned_to)
                .await
            {
                tracing::error!(lead = %id, error = %rollback, "failed to release conversion claim");
            }
            Err(e.into())
        }
    }
}

/// Lead statistics, zero-filled per status
#[derive(Debug, Serialize)]
pub struct LeadStatistics {
    pub total: u64,
    pub total_estimated_value: f64,
    pub new: u64,
    pub contacted: u64,
    pub qualified: u64,
    pub converted: u64,
    pub lost: u64,
}

/// GET /api/leads/stats
pub async fn stats(State(state): State<ServerState>) -> AppResult<Json<LeadStatistics>> {
    let repo = LeadRepository::new(state.db.clone());
    let (total, total_estimated_value, by_status) = repo.statistics().await?;

    let mut stats = LeadStatistics {
        total,
        total_estimated_value,
        new: 0,
        contacted: 0,
        qualified: 0,
        converted: 0,
        lost: 0,
    };
    for row in by_status {
        match row.status {
            LeadStatus::New => stats.new = row.count,
            LeadStatus::Contacted => stats.contacted = row.count,
            LeadStatus::Qualified => stats.qualified = row.count,
            LeadStatus::Converted => stats.converted = row.count,
            LeadStatus::Lost => stats.lost = row.count,
        }
    }
    Ok(Json(stats))
}
