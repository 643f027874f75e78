//! Financial transaction model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::serde_helpers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
}

/// Income or expense entry against an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub transaction_type: TransactionType,
    pub amount: f64,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub account: Option<RecordId>,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub created_by: Option<RecordId>,
    pub created_at: DateTime<Utc>,
}

/// POST /api/finance/transactions
#[derive(Debug, Deserialize, Validate)]
pub struct TransactionCreate {
    pub transaction_type: TransactionType,
    #[validate(range(min = 0.01, max = 1_000_000.0))]
    pub amount: f64,
    pub account: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub reference: Option<String>,
}
