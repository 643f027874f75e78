//! Sales order model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::line_item::LineItem;
use super::serde_helpers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesOrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Completed,
    Cancelled,
}

/// Sales order
///
/// Created directly or by converting a closed-won opportunity;
/// `order_number` comes from the atomic counter (`SO-00001`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesOrder {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub order_number: String,
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
    pub status: SalesOrderStatus,
    pub items: Vec<LineItem>,
    pub subtotal: f64,
    pub discount_total: f64,
    pub tax_total: f64,
    pub total_amount: f64,
    pub order_date: DateTime<Utc>,
    #[serde(default)]
    pub delivery_date: Option<DateTime<Utc>>,
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

/// POST /api/sales/orders
#[derive(Debug, Deserialize, Validate)]
pub struct SalesOrderCreate {
    pub customer: Option<String>,
    #[serde(default = "default_status")]
    pub status: SalesOrderStatus,
    #[validate(length(min = 1), nested)]
    pub items: Vec<LineItem>,
    pub order_date: Option<DateTime<Utc>>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

fn default_status() -> SalesOrderStatus {
    SalesOrderStatus::Pending
}

/// PUT /api/sales/orders/{id}
#[derive(Debug, Serialize, Deserialize)]
pub struct SalesOrderUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SalesOrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}
