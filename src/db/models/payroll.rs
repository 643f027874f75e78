//! Payroll model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::serde_helpers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    Draft,
    Processed,
    Paid,
}

/// Payroll entry, one per employee per (month, year)
///
/// `overtime_amount` and `net_salary` are derived; net salary never goes
/// below zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payroll {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub employee: RecordId,
    pub month: u32,
    pub year: i32,
    pub basic_salary: f64,
    pub allowances: f64,
    pub deductions: f64,
    pub overtime_hours: f64,
    pub overtime_rate: f64,
    pub overtime_amount: f64,
    pub net_salary: f64,
    pub status: PayrollStatus,
    #[serde(default)]
    pub payment_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// POST /api/hr/payroll
#[derive(Debug, Deserialize, Validate)]
pub struct PayrollCreate {
    #[validate(length(min = 1))]
    pub employee: String,
    #[validate(range(min = 1, max = 12))]
    pub month: u32,
    #[validate(range(min = 2000, max = 2100))]
    pub year: i32,
    #[validate(range(min = 0.0))]
    pub basic_salary: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub allowances: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub deductions: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub overtime_hours: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub overtime_rate: f64,
}

/// PUT /api/hr/payroll/{id}
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct PayrollUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PayrollStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<DateTime<Utc>>,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}
