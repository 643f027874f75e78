//! Invoice repository

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, CountRow, RepoError, RepoResult, record_key};
use crate::common::PageParams;
use crate::db::models::{Invoice, InvoiceStatus, Payment};

const TABLE: &str = "invoice";

#[derive(Debug, Default)]
pub struct InvoiceFilter {
    pub status: Option<InvoiceStatus>,
    pub customer: Option<String>,
}

/// Money fields written by a payment, applied under version guard
#[derive(Debug)]
pub struct PaymentApplication {
    pub payments: Vec<Payment>,
    pub amount_paid: f64,
    pub balance: f64,
    pub status: InvoiceStatus,
    pub expected_version: u64,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct InvoiceTotals {
    #[serde(default)]
    pub total_invoiced: f64,
    #[serde(default)]
    pub total_paid: f64,
    #[serde(default)]
    pub total_outstanding: f64,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct InvoiceStatusCount {
    pub status: InvoiceStatus,
    pub count: u64,
    pub amount: f64,
}

#[derive(Clone)]
pub struct InvoiceRepository {
    base: BaseRepository,
}

impl InvoiceRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_page(
        &self,
        filter: InvoiceFilter,
        params: PageParams,
    ) -> RepoResult<(Vec<Invoice>, u64)> {
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
            "SELECT * FROM invoice{w} ORDER BY created_at DESC LIMIT $limit START $start;
             SELECT count() AS total FROM invoice{w} GROUP ALL;",
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
        let invoices: Vec<Invoice> = result.take(0)?;
        let total: Option<CountRow> = result.take(1)?;
        Ok((invoices, total.map(|t| t.total).unwrap_or(0)))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Invoice>> {
        let invoice: Option<Invoice> =
            self.base.db().select((TABLE, record_key(TABLE, id))).await?;
        Ok(invoice)
    }

    pub async fn create(&self, invoice: Invoice) -> RepoResult<Invoice> {
        let created: Option<Invoice> = self.base.db().create(TABLE).content(invoice).await?;
        created.ok_or_else(|| RepoError::Database("invoice insert returned nothing".into()))
    }

    /// Full-document replace, used after item edits recompute the totals
    pub async fn replace(&self, id: &str, invoice: Invoice) -> RepoResult<Option<Invoice>> {
        let updated: Option<Invoice> = self
            .base
            .db()
            .update((TABLE, record_key(TABLE, id)))
            .content(invoice)
            .await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> RepoResult<Option<Invoice>> {
        let deleted: Option<Invoice> =
            self.base.db().delete((TABLE, record_key(TABLE, id))).await?;
        Ok(deleted)
    }

    /// Compare-and-swap payment write
    ///
    /// The update only applies while `version` still equals the value the
    /// caller read; a lost race returns None and the handler maps it to 409.
    pub async fn apply_payment(
        &self,
        id: &str,
        application: PaymentApplication,
    ) -> RepoResult<Option<Invoice>> {
        let key = record_key(TABLE, id).to_string();
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE type::thing('invoice', $id)
                 SET payments = $payments,
                     amount_paid = $amount_paid,
                     balance = $balance,
                     status = $status,
                     version = version + 1,
                     updated_at = $now
                 WHERE version = $version
                 RETURN AFTER",
            )
            .bind(("id", key))
            .bind(("payments", application.payments))
            .bind(("amount_paid", application.amount_paid))
            .bind(("balance", application.balance))
            .bind(("status", application.status))
            .bind(("version", application.expected_version))
            .bind(("now", Utc::now()))
            .await?;
        let invoice: Option<Invoice> = result.take(0)?;
        Ok(invoice)
    }

    /// Overall, per-status and recent rollups for invoice statistics
    pub async fn statistics(
        &self,
        recent_since: DateTime<Utc>,
    ) -> RepoResult<(InvoiceTotals, Vec<InvoiceStatusCount>, InvoiceTotals)> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT math::sum(total_amount) AS total_invoiced,
                        math::sum(amount_paid) AS total_paid,
                        math::sum(balance) AS total_outstanding,
                        count() AS count
                 FROM invoice GROUP ALL;
                 SELECT status, count() AS count, math::sum(total_amount) AS amount
                 FROM invoice GROUP BY status;
                 SELECT math::sum(total_amount) AS total_invoiced,
                        math::sum(amount_paid) AS total_paid,
                        math::sum(balance) AS total_outstanding,
                        count() AS count
                 FROM invoice WHERE created_at >= $since GROUP ALL;",
            )
            .bind(("since", recent_since))
            .await?;

        let overall: Option<InvoiceTotals> = result.take(0)?;
        let by_status: Vec<InvoiceStatusCount> = result.take(1)?;
        let recent: Option<InvoiceTotals> = result.take(2)?;
        Ok((
            overall.unwrap_or_default(),
            by_status,
            recent.unwrap_or_default(),
        ))
    }

    pub async fn count_outstanding(&self) -> RepoResult<u64> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT count() AS total FROM invoice
                 WHERE status IN ['sent', 'partially_paid', 'overdue'] GROUP ALL",
            )
            .await?;
        let row: Option<CountRow> = result.take(0)?;
        Ok(row.map(|r| r.total).unwrap_or(0))
    }
}
