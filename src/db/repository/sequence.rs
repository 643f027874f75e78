//! Atomic document-number sequences
//!
//! Numbers are allocated with a single `UPSERT ... SET value += 1` against
//! a counter record, so two concurrent creates can never observe the same
//! value. Allocation happens before the insert; a failed insert leaves a
//! gap, which is harmless.

use chrono::{Datelike, Utc};
use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};

#[derive(Debug, Deserialize)]
struct CounterRow {
    value: u64,
}

#[derive(Clone)]
pub struct SequenceRepository {
    base: BaseRepository,
}

impl SequenceRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Atomically increment the named counter and return the new value
    pub async fn next(&self, name: &str) -> RepoResult<u64> {
        let mut result = self
            .base
            .db()
            .query("UPSERT type::thing('counter', $name) SET value += 1 RETURN AFTER")
            .bind(("name", name.to_string()))
            .await?;

        let row: Option<CounterRow> = result.take(0)?;
        row.map(|r| r.value)
            .ok_or_else(|| RepoError::Database(format!("counter '{}' returned no row", name)))
    }

    /// Next sales order number: SO-00001, SO-00002, ...
    pub async fn next_order_number(&self) -> RepoResult<String> {
        Ok(format!("SO-{:05}", self.next("sales_order").await?))
    }

    /// Next quotation number: QT-00001, ...
    pub async fn next_quote_number(&self) -> RepoResult<String> {
        Ok(format!("QT-{:05}", self.next("quotation").await?))
    }

    /// Next invoice number, scoped per calendar month: INV2608-0001, ...
    pub async fn next_invoice_number(&self) -> RepoResult<String> {
        let now = Utc::now();
        let counter = format!("invoice_{}{:02}", now.year() % 100, now.month());
        let seq = self.next(&counter).await?;
        Ok(format!(
            "INV{:02}{:02}-{:04}",
            now.year() % 100,
            now.month(),
            seq
        ))
    }

    /// Next employee identifier: EMP001, ...
    pub async fn next_employee_id(&self) -> RepoResult<String> {
        Ok(format!("EMP{:03}", self.next("employee").await?))
    }
}
