//! Lead repository

use chrono::Utc;
use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, CountRow, RepoError, RepoResult, record_key};
use crate::common::PageParams;
use crate::db::models::{Lead, LeadSource, LeadStatus, LeadUpdate};

const TABLE: &str = "lead";

#[derive(Debug, Default)]
pub struct LeadFilter {
    pub status: Option<LeadStatus>,
    pub source: Option<LeadSource>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LeadStatusCount {
    pub status: LeadStatus,
    pub count: u64,
}

#[derive(Clone)]
pub struct LeadRepository {
    base: BaseRepository,
}

impl LeadRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_page(
        &self,
        filter: LeadFilter,
        params: PageParams,
    ) -> RepoResult<(Vec<Lead>, u64)> {
        let mut clauses: Vec<&str> = Vec::new();
        if filter.status.is_some() {
            clauses.push("status = $status");
        }
        if filter.source.is_some() {
            clauses.push("source = $source");
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
            "SELECT * FROM lead{w} ORDER BY created_at DESC LIMIT $limit START $start;
             SELECT count() AS total FROM lead{w} GROUP ALL;",
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
        if let Some(source) = filter.source {
            query = query.bind(("source", source));
        }
        if let Some(search) = filter.search {
            query = query.bind(("search", search));
        }

        let mut result = query.await?;
        let leads: Vec<Lead> = result.take(0)?;
        let total: Option<CountRow> = result.take(1)?;
        Ok((leads, total.map(|t| t.total).unwrap_or(0)))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Lead>> {
        let lead: Option<Lead> = self.base.db().select((TABLE, record_key(TABLE, id))).await?;
        Ok(lead)
    }

    pub async fn create(&self, lead: Lead) -> RepoResult<Lead> {
        let created: Option<Lead> = self.base.db().create(TABLE).content(lead).await?;
        created.ok_or_else(|| RepoError::Database("lead insert returned nothing".into()))
    }

    pub async fn update(&self, id: &str, mut patch: LeadUpdate) -> RepoResult<Option<Lead>> {
        patch.updated_at = Some(Utc::now());
        let updated: Option<Lead> = self
            .base
            .db()
            .update((TABLE, record_key(TABLE, id)))
            .merge(patch)
            .await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> RepoResult<Option<Lead>> {
        let deleted: Option<Lead> = self.base.db().delete((TABLE, record_key(TABLE, id))).await?;
        Ok(deleted)
    }

    /// Claim a lead for conversion
    ///
    /// The conditional update flips the status to `converted` only when it
    /// is not already there, so exactly one of two racing converts wins.
    /// Conversion is terminal, so the claim also clears the assignment.
    /// Returns the claimed lead, or None when the claim failed.
    pub async fn claim_for_conversion(&self, id: &str) -> RepoResult<Option<Lead>> {
        let key = record_key(TABLE, id).to_string();
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE type::thing('lead', $id)
                 SET status = 'converted', assigned_to = NONE, updated_at = $now
                 WHERE status != 'converted'
                 RETURN AFTER",
            )
            .bind(("id", key))
            .bind(("now", Utc::now()))
            .await?;
        let lead: Option<Lead> = result.take(0)?;
        Ok(lead)
    }

    /// Undo a conversion claim after a failed customer insert, restoring the
    /// prior status and assignment
    pub async fn release_conversion_claim(
        &self,
        id: &str,
        status: LeadStatus,
        assigned_to: Option<surrealdb::RecordId>,
    ) -> RepoResult<()> {
        let key = record_key(TABLE, id).to_string();
        self.base
            .db()
            .query(
                "UPDATE type::thing('lead', $id)
                 SET status = $status, assigned_to = $assigned_to, updated_at = $now",
            )
            .bind(("id", key))
            .bind(("status", status))
            .bind(("assigned_to", assigned_to))
            .bind(("now", Utc::now()))
            .await?;
        Ok(())
    }

    /// Totals, expected revenue and per-status counts for the lead
    /// statistics endpoint
    pub async fn statistics(&self) -> RepoResult<(u64, f64, Vec<LeadStatusCount>)> {
        #[derive(Deserialize)]
        struct ValueRow {
            #[serde(default)]
            value: f64,
        }

        let mut result = self
            .base
            .db()
            .query(
                "SELECT count() AS total FROM lead GROUP ALL;
                 SELECT math::sum(estimated_value ?? 0) AS value FROM lead GROUP ALL;
                 SELECT status, count() AS count FROM lead GROUP BY status;",
            )
            .await?;
        let total: Option<CountRow> = result.take(0)?;
        let value: Option<ValueRow> = result.take(1)?;
        let by_status: Vec<LeadStatusCount> = result.take(2)?;
        Ok((
            total.map(|t| t.total).unwrap_or(0),
            value.map(|v| v.value).unwrap_or(0.0),
            by_status,
        ))
    }
}
