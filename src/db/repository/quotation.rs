//! Quotation repository

use chrono::Utc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, CountRow, RepoError, RepoResult, record_key};
use crate::common::PageParams;
use crate::db::models::{Quotation, QuotationStatus};

const TABLE: &str = "quotation";

#[derive(Debug, Default)]
pub struct QuotationFilter {
    pub status: Option<QuotationStatus>,
    pub customer: Option<String>,
}

#[derive(Clone)]
pub struct QuotationRepository {
    base: BaseRepository,
}

impl QuotationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_page(
        &self,
        filter: QuotationFilter,
        params: PageParams,
    ) -> RepoResult<(Vec<Quotation>, u64)> {
        let mut clauses: Vec<&str> = Vec::new();
        if filter.status.is_some() {
            clauses.push("status = $status");
        }
        if filter.customer.is_some() {
            clauses.push("customer = type::thing('customer', $customer)");
        }
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let sql = format!(
            "SELECT * FROM quotation{w} ORDER BY created_at DESC LIMIT $limit START $start;
             SELECT count() AS total FROM quotation{w} GROUP ALL;",
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
        if let Some(customer) = filter.customer {
            query = query.bind(("customer", record_key("customer", &customer).to_string()));
        }

        let mut result = query.await?;
        let quotations: Vec<Quotation> = result.take(0)?;
        let total: Option<CountRow> = result.take(1)?;
        Ok((quotations, total.map(|t| t.total).unwrap_or(0)))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Quotation>> {
        let quotation: Option<Quotation> =
            self.base.db().select((TABLE, record_key(TABLE, id))).await?;
        Ok(quotation)
    }

    pub async fn create(&self, quotation: Quotation) -> RepoResult<Quotation> {
        let created: Option<Quotation> = self.base.db().create(TABLE).content(quotation).await?;
        created.ok_or_else(|| RepoError::Database("quotation insert returned nothing".into()))
    }

    /// Full-document replace after totals recomputation
    pub async fn replace(&self, id: &str, quotation: Quotation) -> RepoResult<Option<Quotation>> {
        let updated: Option<Quotation> = self
            .base
            .db()
            .update((TABLE, record_key(TABLE, id)))
            .content(quotation)
            .await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> RepoResult<Option<Quotation>> {
        let deleted: Option<Quotation> =
            self.base.db().delete((TABLE, record_key(TABLE, id))).await?;
        Ok(deleted)
    }

    /// Flip an open quotation to `accepted`/`rejected`
    ///
    /// Conditional on the status still being draft or sent; a quotation that
    /// was already decided returns None.
    pub async fn decide(
        &self,
        id: &str,
        status: QuotationStatus,
    ) -> RepoResult<Option<Quotation>> {
        let key = record_key(TABLE, id).to_string();
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE type::thing('quotation', $id)
                 SET status = $status, updated_at = $now
                 WHERE status IN ['draft', 'sent']
                 RETURN AFTER",
            )
            .bind(("id", key))
            .bind(("status", status))
            .bind(("now", Utc::now()))
            .await?;
        let quotation: Option<Quotation> = result.take(0)?;
        Ok(quotation)
    }
}
