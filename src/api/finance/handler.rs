//! Finance handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::common::{AppError, AppResult, Page, PageParams};
use crate::core::ServerState;
use crate::db::models::{
    Account, AccountCreate, AccountUpdate, Transaction, TransactionCreate, TransactionType,
};
use crate::db::repository::finance::{FlowSummary, TransactionFilter};
use crate::db::repository::{FinanceRepository, record_key};

/// GET /api/finance/accounts
pub async fn list_accounts(State(state): State<ServerState>) -> AppResult<Json<Vec<Account>>> {
    let repo = FinanceRepository::new(state.db.clone());
    let accounts = repo.list_accounts().await?;
    Ok(Json(accounts))
}

/// GET /api/finance/accounts/{id}
pub async fn get_account(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Account>> {
    let repo = FinanceRepository::new(state.db.clone());
    let account = repo
        .find_account(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Account {}", id)))?;
    Ok(Json(account))
}

/// POST /api/finance/accounts
pub async fn create_account(
    State(state): State<ServerState>,
    Json(payload): Json<AccountCreate>,
) -> AppResult<Json<Account>> {
    payload.validate()?;

    let now = Utc::now();
    let account = Account {
        id: None,
        name: payload.name,
        code: payload.code,
        account_type: payload.account_type,
        parent: payload
            .parent
            .map(|id| RecordId::from_table_key("account", record_key("account", &id))),
        description: payload.description,
        is_active: payload.is_active,
        created_at: now,
        updated_at: now,
    };

    let repo = FinanceRepository::new(state.db.clone());
    let created = repo.create_account(account).await.map_err(|e| match e {
        crate::db::repository::RepoError::Duplicate(_) => {
            AppError::conflict("An account with this code already exists")
        }
        other => other.into(),
    })?;
    Ok(Json(created))
}

/// PUT /api/finance/accounts/{id}
pub async fn update_account(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<AccountUpdate>,
) -> AppResult<Json<Account>> {
    payload.validate()?;
    let repo = FinanceRepository::new(state.db.clone());
    let account = repo
        .update_account(&id, payload)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Account {}", id)))?;
    Ok(Json(account))
}

/// DELETE /api/finance/accounts/{id}
pub async fn delete_account(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = FinanceRepository::new(state.db.clone());
    repo.delete_account(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Account {}", id)))?;
    Ok(Json(true))
}

#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    pub account: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// GET /api/finance/transactions
pub async fn list_transactions(
    State(state): State<ServerState>,
    Query(query): Query<TransactionQuery>,
) -> AppResult<Json<Page<Transaction>>> {
    let params = PageParams::new(query.page, query.limit);
    let filter = TransactionFilter {
        transaction_type: query.transaction_type,
        account: query.account,
        from: query.from,
        to: query.to,
    };
    let repo = FinanceRepository::new(state.db.clone());
    let (transactions, total) = repo.find_transactions(filter, params).await?;
    Ok(Json(Page::new(transactions, total, params)))
}

/// POST /api/finance/transactions
pub async fn create_transaction(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<TransactionCreate>,
) -> AppResult<Json<Transaction>> {
    payload.validate()?;

    let now = Utc::now();
    let transaction = Transaction {
        id: None,
        transaction_type: payload.transaction_type,
        amount: payload.amount,
        account: payload
            .account
            .map(|id| RecordId::from_table_key("account", record_key("account", &id))),
        date: payload.date.unwrap_or(now),
        description: payload.description,
        reference: payload.reference,
        created_by: Some(RecordId::from_table_key(
            "user",
            record_key("user", &current.id),
        )),
        created_at: now,
    };

    let repo = FinanceRepository::new(state.db.clone());
    let created = repo.create_transaction(transaction).await?;
    Ok(Json(created))
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct FinanceSummary {
    pub income: FlowSummary,
    pub expense: FlowSummary,
    pub net: f64,
}

/// GET /api/finance/summary
pub async fn summary(
    State(state): State<ServerState>,
    Query(query): Query<SummaryQuery>,
) -> AppResult<Json<FinanceSummary>> {
    let repo = FinanceRepository::new(state.db.clone());
    let (income, expense) = tokio::join!(
        repo.flow_summary(TransactionType::Income, query.from, query.to),
        repo.flow_summary(TransactionType::Expense, query.from, query.to),
    );
    let income = income?;
    let expense = expense?;
    let net = income.amount - expense.amount;

    Ok(Json(FinanceSummary {
        income,
        expense,
        net,
    }))
}
