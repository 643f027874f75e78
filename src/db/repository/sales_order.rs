//! Sales order repository

use chrono::{DateTime, Utc};
use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, CountRow, RepoError, RepoResult, record_key};
use crate::common::PageParams;
use crate::db::models::{LineItem, SalesOrder, SalesOrderStatus, SalesOrderUpdate};

const TABLE: &str = "sales_order";

#[derive(Debug, Default)]
pub struct SalesOrderFilter {
    pub status: Option<SalesOrderStatus>,
    pub customer: Option<String>,
}

/// Revenue rollup over completed orders
#[derive(Debug, Default, Deserialize)]
pub struct RevenueSummary {
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub orders: u64,
}

/// Revenue grouped by calendar month
#[derive(Debug, Deserialize, serde::Serialize)]
pub struct MonthlyRevenue {
    pub month: u32,
    pub revenue: f64,
    pub orders: u64,
}

#[derive(Clone)]
pub struct SalesOrderRepository {
    base: BaseRepository,
}

impl SalesOrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_page(
        &self,
        filter: SalesOrderFilter,
        params: PageParams,
    ) -> RepoResult<(Vec<SalesOrder>, u64)> {
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
            "SELECT * FROM sales_order{w} ORDER BY created_at DESC LIMIT $limit START $start;
             SELECT count() AS total FROM sales_order{w} GROUP ALL;",
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
        let orders: Vec<SalesOrder> = result.take(0)?;
        let total: Option<CountRow> = result.take(1)?;
        Ok((orders, total.map(|t| t.total).unwrap_or(0)))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<SalesOrder>> {
        let order: Option<SalesOrder> =
            self.base.db().select((TABLE, record_key(TABLE, id))).await?;
        Ok(order)
    }

    pub async fn create(&self, order: SalesOrder) -> RepoResult<SalesOrder> {
        let created: Option<SalesOrder> = self.base.db().create(TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("sales order insert returned nothing".into()))
    }

    pub async fn update(&self, id: &str, mut patch: SalesOrderUpdate) -> RepoResult<Option<SalesOrder>> {
        patch.updated_at = Some(Utc::now());
        let updated: Option<SalesOrder> = self
            .base
            .db()
            .update((TABLE, record_key(TABLE, id)))
            .merge(patch)
            .await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> RepoResult<Option<SalesOrder>> {
        let deleted: Option<SalesOrder> =
            self.base.db().delete((TABLE, record_key(TABLE, id))).await?;
        Ok(deleted)
    }

    /// Revenue and order count over delivered/completed orders since `since`
    pub async fn revenue_since(&self, since: DateTime<Utc>) -> RepoResult<RevenueSummary> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT math::sum(total_amount) AS revenue, count() AS orders
                 FROM sales_order
                 WHERE status IN ['delivered', 'completed'] AND created_at >= $since
                 GROUP ALL",
            )
            .bind(("since", since))
            .await?;
        let row: Option<RevenueSummary> = result.take(0)?;
        Ok(row.unwrap_or_default())
    }

    /// Monthly revenue buckets over delivered/completed orders since `since`
    pub async fn revenue_by_month(&self, since: DateTime<Utc>) -> RepoResult<Vec<MonthlyRevenue>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT time::month(created_at) AS month,
                        math::sum(total_amount) AS revenue,
                        count() AS orders
                 FROM sales_order
                 WHERE status IN ['delivered', 'completed'] AND created_at >= $since
                 GROUP BY month
                 ORDER BY month",
            )
            .bind(("since", since))
            .await?;
        let rows: Vec<MonthlyRevenue> = result.take(0)?;
        Ok(rows)
    }

    /// Line items of all delivered/completed orders, for product rollups
    pub async fn completed_order_items(&self) -> RepoResult<Vec<Vec<LineItem>>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT VALUE items FROM sales_order
                 WHERE status IN ['delivered', 'completed']",
            )
            .await?;
        let items: Vec<Vec<LineItem>> = result.take(0)?;
        Ok(items)
    }

    pub async fn count_by_status(&self, status: SalesOrderStatus) -> RepoResult<u64> {
        let mut result = self
            .base
            .db()
            .query("SELECT count() AS total FROM sales_order WHERE status = $status GROUP ALL")
            .bind(("status", status))
            .await?;
        let row: Option<CountRow> = result.take(0)?;
        Ok(row.map(|r| r.total).unwrap_or(0))
    }
}
