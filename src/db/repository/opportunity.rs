//! Opportunity repository

use chrono::Utc;
use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, CountRow, RepoError, RepoResult, record_key};
use crate::common::PageParams;
use crate::db::models::{Activity, Opportunity, OpportunityStage, OpportunityUpdate};

const TABLE: &str = "opportunity";

#[derive(Debug, Default)]
pub struct OpportunityFilter {
    pub stage: Option<OpportunityStage>,
    pub customer: Option<String>,
}

/// Per-stage rollup with pipeline value
#[derive(Debug, Serialize, Deserialize)]
pub struct StageStats {
    pub stage: OpportunityStage,
    pub count: u64,
    pub total_value: f64,
}

#[derive(Clone)]
pub struct OpportunityRepository {
    base: BaseRepository,
}

impl OpportunityRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_page(
        &self,
        filter: OpportunityFilter,
        params: PageParams,
    ) -> RepoResult<(Vec<Opportunity>, u64)> {
        let mut clauses: Vec<&str> = Vec::new();
        if filter.stage.is_some() {
            clauses.push("stage = $stage");
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
            "SELECT * FROM opportunity{w} ORDER BY created_at DESC LIMIT $limit START $start;
             SELECT count() AS total FROM opportunity{w} GROUP ALL;",
            w = where_sql
        );

        let mut query = self
            .base
            .db()
            .query(sql)
            .bind(("limit", params.limit))
            .bind(("start", params.start()));
        if let Some(stage) = filter.stage {
            query = query.bind(("stage", stage));
        }
        if let Some(customer) = filter.customer {
            query = query.bind(("customer", record_key("customer", &customer).to_string()));
        }

        let mut result = query.await?;
        let opportunities: Vec<Opportunity> = result.take(0)?;
        let total: Option<CountRow> = result.take(1)?;
        Ok((opportunities, total.map(|t| t.total).unwrap_or(0)))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Opportunity>> {
        let opportunity: Option<Opportunity> =
            self.base.db().select((TABLE, record_key(TABLE, id))).await?;
        Ok(opportunity)
    }

    pub async fn create(&self, opportunity: Opportunity) -> RepoResult<Opportunity> {
        let created: Option<Opportunity> =
            self.base.db().create(TABLE).content(opportunity).await?;
        created.ok_or_else(|| RepoError::Database("opportunity insert returned nothing".into()))
    }

    pub async fn update(
        &self,
        id: &str,
        mut patch: OpportunityUpdate,
    ) -> RepoResult<Option<Opportunity>> {
        patch.updated_at = Some(Utc::now());
        let updated: Option<Opportunity> = self
            .base
            .db()
            .update((TABLE, record_key(TABLE, id)))
            .merge(patch)
            .await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> RepoResult<Option<Opportunity>> {
        let deleted: Option<Opportunity> =
            self.base.db().delete((TABLE, record_key(TABLE, id))).await?;
        Ok(deleted)
    }

    /// Stamp the conversion result onto a closed-won opportunity
    ///
    /// The guard repeats the conversion preconditions so a racing second
    /// convert (or a late stage change) fails cleanly with None.
    pub async fn mark_converted(&self, id: &str, order_id: &str) -> RepoResult<Option<Opportunity>> {
        let key = record_key(TABLE, id).to_string();
        let order_key = record_key("sales_order", order_id).to_string();
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE type::thing('opportunity', $id)
                 SET converted_to_order_id = type::thing('sales_order', $order),
                     closed_date = $now,
                     updated_at = $now
                 WHERE stage = 'closed-won' AND converted_to_order_id IS NONE
                 RETURN AFTER",
            )
            .bind(("id", key))
            .bind(("order", order_key))
            .bind(("now", Utc::now()))
            .await?;
        let opportunity: Option<Opportunity> = result.take(0)?;
        Ok(opportunity)
    }

    /// Append a logged activity, newest last
    pub async fn add_activity(
        &self,
        id: &str,
        activity: Activity,
    ) -> RepoResult<Option<Opportunity>> {
        let key = record_key(TABLE, id).to_string();
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE type::thing('opportunity', $id)
                 SET activities += $activity, updated_at = $now
                 RETURN AFTER",
            )
            .bind(("id", key))
            .bind(("activity", activity))
            .bind(("now", Utc::now()))
            .await?;
        let opportunity: Option<Opportunity> = result.take(0)?;
        Ok(opportunity)
    }

    /// Count and pipeline value per stage
    pub async fn stats_by_stage(&self) -> RepoResult<Vec<StageStats>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT stage, count() AS count, math::sum(amount) AS total_value
                 FROM opportunity GROUP BY stage",
            )
            .await?;
        let rows: Vec<StageStats> = result.take(0)?;
        Ok(rows)
    }
}
