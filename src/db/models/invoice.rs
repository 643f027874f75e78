//! Invoice model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::line_item::LineItem;
use super::serde_helpers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    PartiallyPaid,
    Paid,
    Overdue,
    Cancelled,
    Void,
}

impl InvoiceStatus {
    /// Cancelled and void invoices accept no further payments or edits and
    /// never change status through reconciliation
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Void)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    CreditCard,
    Cheque,
    Online,
}

/// One recorded payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub amount: f64,
    pub date: DateTime<Utc>,
    pub method: PaymentMethod,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub recorded_by: Option<RecordId>,
}

/// Invoice
///
/// Money fields (`subtotal`, totals, `amount_paid`, `balance`) are always
/// derived server-side. `version` guards payment writes: every payment
/// increments it, and a stale writer loses with a 409.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub invoice_number: String,
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
    pub sales_order: Option<RecordId>,
    pub status: InvoiceStatus,
    pub items: Vec<LineItem>,
    pub subtotal: f64,
    pub discount_total: f64,
    pub tax_total: f64,
    pub total_amount: f64,
    pub amount_paid: f64,
    pub balance: f64,
    pub payments: Vec<Payment>,
    pub issue_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
    pub version: u64,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub created_by: Option<RecordId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// POST /api/sales/invoices
#[derive(Debug, Deserialize, Validate)]
pub struct InvoiceCreate {
    pub customer: Option<String>,
    pub sales_order: Option<String>,
    #[serde(default = "default_status")]
    pub status: InvoiceStatus,
    #[validate(length(min = 1), nested)]
    pub items: Vec<LineItem>,
    pub due_date: DateTime<Utc>,
    pub issue_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

fn default_status() -> InvoiceStatus {
    InvoiceStatus::Draft
}

/// PUT /api/sales/invoices/{id}
///
/// Items replace the whole list; totals are recomputed on the way in.
#[derive(Debug, Deserialize, Validate)]
pub struct InvoiceUpdate {
    pub status: Option<InvoiceStatus>,
    #[validate(length(min = 1), nested)]
    pub items: Option<Vec<LineItem>>,
    pub due_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// POST /api/sales/invoices/{id}/payments
#[derive(Debug, Deserialize, Validate)]
pub struct PaymentRequest {
    #[validate(range(min = 0.01, max = 1_000_000.0))]
    pub amount: f64,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub date: Option<DateTime<Utc>>,
}
