//! Product repository

use chrono::Utc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, CountRow, RepoError, RepoResult, record_key};
use crate::common::PageParams;
use crate::db::models::{Product, ProductUpdate};

const TABLE: &str = "product";

#[derive(Debug, Default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub active_only: bool,
    pub search: Option<String>,
}

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_page(
        &self,
        filter: ProductFilter,
        params: PageParams,
    ) -> RepoResult<(Vec<Product>, u64)> {
        let mut clauses: Vec<&str> = Vec::new();
        if filter.category.is_some() {
            clauses.push("category = $category");
        }
        if filter.active_only {
            clauses.push("is_active = true");
        }
        if filter.search.is_some() {
            clauses.push(
                "(string::lowercase(name) CONTAINS string::lowercase($search)
                  OR string::lowercase(sku) CONTAINS string::lowercase($search))",
            );
        }
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let sql = format!(
            "SELECT * FROM product{w} ORDER BY name ASC LIMIT $limit START $start;
             SELECT count() AS total FROM product{w} GROUP ALL;",
            w = where_sql
        );

        let mut query = self
            .base
            .db()
            .query(sql)
            .bind(("limit", params.limit))
            .bind(("start", params.start()));
        if let Some(category) = filter.category {
            query = query.bind(("category", category));
        }
        if let Some(search) = filter.search {
            query = query.bind(("search", search));
        }

        let mut result = query.await?;
        let products: Vec<Product> = result.take(0)?;
        let total: Option<CountRow> = result.take(1)?;
        Ok((products, total.map(|t| t.total).unwrap_or(0)))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let product: Option<Product> =
            self.base.db().select((TABLE, record_key(TABLE, id))).await?;
        Ok(product)
    }

    pub async fn create(&self, product: Product) -> RepoResult<Product> {
        let created: Option<Product> = self.base.db().create(TABLE).content(product).await?;
        created.ok_or_else(|| RepoError::Database("product insert returned nothing".into()))
    }

    pub async fn update(&self, id: &str, mut patch: ProductUpdate) -> RepoResult<Option<Product>> {
        patch.updated_at = Some(Utc::now());
        let updated: Option<Product> = self
            .base
            .db()
            .update((TABLE, record_key(TABLE, id)))
            .merge(patch)
            .await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> RepoResult<Option<Product>> {
        let deleted: Option<Product> =
            self.base.db().delete((TABLE, record_key(TABLE, id))).await?;
        Ok(deleted)
    }
}
