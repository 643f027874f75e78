//! Quotation model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::line_item::LineItem;
use super::serde_helpers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotationStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
    Expired,
    Converted,
}

impl QuotationStatus {
    /// Only draft or sent quotations may be accepted or rejected
    pub fn is_open(&self) -> bool {
        matches!(self, QuotationStatus::Draft | QuotationStatus::Sent)
    }
}

/// Quotation
///
/// Totals follow the same per-line formula as invoices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quotation {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub quote_number: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub customer: Option<RecordId>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub opportunity: Option<RecordId>,
    pub status: QuotationStatus,
    pub items: Vec<LineItem>,
    pub subtotal: f64,
    pub discount_total: f64,
    pub tax_total: f64,
    pub total_amount: f64,
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub created_by: Option<RecordId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// POST /api/quotations
#[derive(Debug, Deserialize, Validate)]
pub struct QuotationCreate {
    pub customer: Option<String>,
    pub opportunity: Option<String>,
    #[serde(default = "default_status")]
    pub status: QuotationStatus,
    #[validate(length(min = 1), nested)]
    pub items: Vec<LineItem>,
    pub valid_until: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

fn default_status() -> QuotationStatus {
    QuotationStatus::Draft
}

/// PUT /api/quotations/{id}
#[derive(Debug, Deserialize, Validate)]
pub struct QuotationUpdate {
    pub status: Option<QuotationStatus>,
    #[validate(length(min = 1), nested)]
    pub items: Option<Vec<LineItem>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}
