//! Finance repository: accounts, transactions and the income/expense summary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, CountRow, RepoError, RepoResult, record_key};
use crate::common::PageParams;
use crate::db::models::{Account, AccountUpdate, Transaction, TransactionType};

#[derive(Debug, Default)]
pub struct TransactionFilter {
    pub transaction_type: Option<TransactionType>,
    pub account: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FlowSummary {
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub count: u64,
}

#[derive(Clone)]
pub struct FinanceRepository {
    base: BaseRepository,
}

impl FinanceRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    // ========== Accounts ==========

    pub async fn list_accounts(&self) -> RepoResult<Vec<Account>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM account ORDER BY code ASC")
            .await?;
        let accounts: Vec<Account> = result.take(0)?;
        Ok(accounts)
    }

    pub async fn find_account(&self, id: &str) -> RepoResult<Option<Account>> {
        let account: Option<Account> = self
            .base
            .db()
            .select(("account", record_key("account", id)))
            .await?;
        Ok(account)
    }

    pub async fn create_account(&self, account: Account) -> RepoResult<Account> {
        let created: Option<Account> = self.base.db().create("account").content(account).await?;
        created.ok_or_else(|| RepoError::Database("account insert returned nothing".into()))
    }

    pub async fn update_account(
        &self,
        id: &str,
        mut patch: AccountUpdate,
    ) -> RepoResult<Option<Account>> {
        patch.updated_at = Some(Utc::now());
        let updated: Option<Account> = self
            .base
            .db()
            .update(("account", record_key("account", id)))
            .merge(patch)
            .await?;
        Ok(updated)
    }

    pub async fn delete_account(&self, id: &str) -> RepoResult<Option<Account>> {
        let deleted: Option<Account> = self
            .base
            .db()
            .delete(("account", record_key("account", id)))
            .await?;
        Ok(deleted)
    }

    // ========== Transactions ==========

    pub async fn find_transactions(
        &self,
        filter: TransactionFilter,
        params: PageParams,
    ) -> RepoResult<(Vec<Transaction>, u64)> {
        let mut clauses: Vec<&str> = Vec::new();
        if filter.transaction_type.is_some() {
            clauses.push("transaction_type = $type");
        }
        if filter.account.is_some() {
            clauses.push("account = type::thing('account', $account)");
        }
        if filter.from.is_some() {
            clauses.push("date >= $from");
        }
        if filter.to.is_some() {
            clauses.push("date <= $to");
        }
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let sql = format!(
            "SELECT * FROM transaction{w} ORDER BY date DESC LIMIT $limit START $start;
             SELECT count() AS total FROM transaction{w} GROUP ALL;",
            w = where_sql
        );

        let mut query = self
            .base
            .db()
            .query(sql)
            .bind(("limit", params.limit))
            .bind(("start", params.start()));
        if let Some(transaction_type) = filter.transaction_type {
            query = query.bind(("type", transaction_type));
        }
        if let Some(account) = filter.account {
            query = query.bind(("account", record_key("account", &account).to_string()));
        }
        if let Some(from) = filter.from {
            query = query.bind(("from", from));
        }
        if let Some(to) = filter.to {
            query = query.bind(("to", to));
        }

        let mut result = query.await?;
        let transactions: Vec<Transaction> = result.take(0)?;
        let total: Option<CountRow> = result.take(1)?;
        Ok((transactions, total.map(|t| t.total).unwrap_or(0)))
    }

    pub async fn create_transaction(&self, transaction: Transaction) -> RepoResult<Transaction> {
        let created: Option<Transaction> = self
            .base
            .db()
            .create("transaction")
            .content(transaction)
            .await?;
        created.ok_or_else(|| RepoError::Database("transaction insert returned nothing".into()))
    }

    /// Sum one side of the ledger, optionally bounded by a date range
    pub async fn flow_summary(
        &self,
        transaction_type: TransactionType,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> RepoResult<FlowSummary> {
        let mut clauses = vec!["transaction_type = $type"];
        if from.is_some() {
            clauses.push("date >= $from");
        }
        if to.is_some() {
            clauses.push("date <= $to");
        }

        let sql = format!(
            "SELECT math::sum(amount) AS amount, count() AS count
             FROM transaction WHERE {} GROUP ALL",
            clauses.join(" AND ")
        );

        let mut query = self.base.db().query(sql).bind(("type", transaction_type));
        if let Some(from) = from {
            query = query.bind(("from", from));
        }
        if let Some(to) = to {
            query = query.bind(("to", to));
        }

        let mut result = query.await?;
        let row: Option<FlowSummary> = result.take(0)?;
        Ok(row.unwrap_or_default())
    }
}
