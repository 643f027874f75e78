//! Customer repository

use chrono::Utc;
use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, CountRow, RepoError, RepoResult, record_key};
use crate::common::PageParams;
use crate::db::models::{Customer, CustomerStatus, CustomerUpdate};

const TABLE: &str = "customer";

/// Filters accepted by the customer list endpoint
#[derive(Debug, Default)]
pub struct CustomerFilter {
    pub status: Option<CustomerStatus>,
    pub search: Option<String>,
}

/// Per-status rollup row
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: CustomerStatus,
    pub count: u64,
}

#[derive(Clone)]
pub struct CustomerRepository {
    base: BaseRepository,
}

impl CustomerRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_page(
        &self,
        filter: CustomerFilter,
        params: PageParams,
    ) -> RepoResult<(Vec<Customer>, u64)> {
        let mut clauses: Vec<&str> = Vec::new();
        if filter.status.is_some() {
            clauses.push("status = $status");
        }
        if filter.search.is_some() {
            clauses.push(
                "(string::lowercase(name) CONTAINS string::lowercase($search)
                  OR string::lowercase(email) CONTAINS string::lowercase($search))",
            );
        }
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let sql = format!(
            "SELECT * FROM customer{w} ORDER BY created_at DESC LIMIT $limit START $start;
             SELECT count() AS total FROM customer{w} GROUP ALL;",
            w = where_sql
        );

        let mut query = self
            .base
            .db()
            .query(sql)
            .bind(("limit", params.limit))
            .bind(("start", params.start()));
        if let Some(status) = filter.status {
            query = query.bind(("status", status));
        }
        if let Some(search) = filter.search {
            query = query.bind(("search", search));
        }

        let mut result = query.await?;
        let customers: Vec<Customer> = result.take(0)?;
        let total: Option<CountRow> = result.take(1)?;
        Ok((customers, total.map(|t| t.total).unwrap_or(0)))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Customer>> {
        let customer: Option<Customer> =
            self.base.db().select((TABLE, record_key(TABLE, id))).await?;
        Ok(customer)
    }

    pub async fn create(&self, customer: Customer) -> RepoResult<Customer> {
        let created: Option<Customer> = self.base.db().create(TABLE).content(customer).await?;
        created.ok_or_else(|| RepoError::Database("customer insert returned nothing".into()))
    }

    pub async fn update(&self, id: &str, mut patch: CustomerUpdate) -> RepoResult<Option<Customer>> {
        patch.updated_at = Some(Utc::now());
        let updated: Option<Customer> = self
            .base
            .db()
            .update((TABLE, record_key(TABLE, id)))
            .merge(patch)
            .await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> RepoResult<Option<Customer>> {
        let deleted: Option<Customer> =
            self.base.db().delete((TABLE, record_key(TABLE, id))).await?;
        Ok(deleted)
    }

    /// Counts per status for the customer statistics endpoint
    pub async fn count_by_status(&self) -> RepoResult<Vec<StatusCount>> {
        let mut result = self
            .base
            .db()
            .query("SELECT status, count() AS count FROM customer GROUP BY status")
            .await?;
        let rows: Vec<StatusCount> = result.take(0)?;
        Ok(rows)
    }
}
