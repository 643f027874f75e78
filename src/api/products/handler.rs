//! Product catalog handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde::Deserialize;
use validator::Validate;

use crate::common::{AppError, AppResult, Page, PageParams};
use crate::core::ServerState;
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use crate::db::repository::ProductRepository;
use crate::db::repository::product::ProductFilter;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub category: Option<String>,
    #[serde(default)]
    pub active_only: bool,
    pub search: Option<String>,
}

/// GET /api/products
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<Product>>> {
    let params = PageParams::new(query.page, query.limit);
    let filter = ProductFilter {
        category: query.category,
        active_only: query.active_only,
        search: query.search,
    };
    let repo = ProductRepository::new(state.db.clone());
    let (products, total) = repo.find_page(filter, params).await?;
    Ok(Json(Page::new(products, total, params)))
}

/// GET /api/products/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let repo = ProductRepository::new(state.db.clone());
    let product = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {}", id)))?;
    Ok(Json(product))
}

/// POST /api/products
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    payload.validate()?;

    let now = Utc::now();
    let product = Product {
        id: None,
        name: payload.name,
        sku: payload.sku,
        description: payload.description,
        category: payload.category,
        price: payload.price,
        cost: payload.cost,
        stock_quantity: payload.stock_quantity,
        unit: payload.unit,
        is_active: payload.is_active,
        created_at: now,
        updated_at: now,
    };

    let repo = ProductRepository::new(state.db.clone());
    let created = repo.create(product).await.map_err(|e| match e {
        crate::db::repository::RepoError::Duplicate(_) => {
            AppError::conflict("A product with this SKU already exists")
        }
        other => other.into(),
    })?;
    Ok(Json(created))
}

/// PUT /api/products/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    payload.validate()?;
    let repo = ProductRepository::new(state.db.clone());
    let product = repo
        .update(&id, payload)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {}", id)))?;
    Ok(Json(product))
}

/// DELETE /api/products/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = ProductRepository::new(state.db.clone());
    repo.delete(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {}", id)))?;
    Ok(Json(true))
}
