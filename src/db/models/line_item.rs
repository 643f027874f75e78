//! Shared line item for invoices, quotations and sales orders

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::serde_helpers;

/// One document line
///
/// `discount` and `tax` are percentages in [0, 100]. `total` is derived by
/// the totals calculator; incoming values are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LineItem {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub product: Option<RecordId>,
    #[validate(length(min = 1, max = 500))]
    pub description: String,
    #[validate(range(min = 1))]
    pub quantity: u32,
    #[validate(range(min = 0.0, max = 1_000_000.0))]
    pub unit_price: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub discount: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub tax: f64,
    #[serde(default)]
    pub total: f64,
}
