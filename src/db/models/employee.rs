//! Employee model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::serde_helpers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    Active,
    OnLeave,
    Terminated,
}

/// Employee record
///
/// `employee_id` is the human-facing identifier (`EMP001`, ...) from the
/// atomic counter. `user` links the login account when one was provisioned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub employee_id: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub user: Option<RecordId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub department: Option<RecordId>,
    #[serde(default)]
    pub designation: Option<String>,
    pub join_date: NaiveDate,
    pub salary: f64,
    pub status: EmployeeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// POST /api/hr/employees
///
/// With `password` set, a login user is created in the same transaction as
/// the employee; `user_role` defaults to `support`.
#[derive(Debug, Deserialize, Validate)]
pub struct EmployeeCreate {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub join_date: NaiveDate,
    #[validate(range(min = 0.0))]
    pub salary: f64,
    #[serde(default = "default_status")]
    pub status: EmployeeStatus,
    /// Optional login provisioning
    #[validate(length(min = 6, max = 128))]
    pub password: Option<String>,
    pub user_role: Option<crate::auth::Role>,
}

fn default_status() -> EmployeeStatus {
    EmployeeStatus::Active
}

/// PUT /api/hr/employees/{id}
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct EmployeeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0))]
    pub salary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EmployeeStatus>,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}
