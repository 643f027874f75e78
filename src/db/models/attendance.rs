//! Attendance model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::serde_helpers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    HalfDay,
    Leave,
}

/// One attendance record per employee per calendar day
///
/// The (employee, date) pair is unique; check-in creates the record,
/// check-out closes it and derives `total_hours`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendance {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub employee: RecordId,
    pub date: NaiveDate,
    #[serde(default)]
    pub check_in: Option<DateTime<Utc>>,
    #[serde(default)]
    pub check_out: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_hours: Option<f64>,
    pub status: AttendanceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckDirection {
    In,
    Out,
}

/// POST /api/hr/attendance/check
#[derive(Debug, Deserialize, Validate)]
pub struct CheckRequest {
    #[validate(length(min = 1))]
    pub employee: String,
    pub direction: CheckDirection,
}

/// POST /api/hr/attendance
///
/// Manual record entry, used for backfilling absences and half days.
#[derive(Debug, Deserialize, Validate)]
pub struct AttendanceCreate {
    #[validate(length(min = 1))]
    pub employee: String,
    pub date: NaiveDate,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    pub total_hours: Option<f64>,
    #[serde(default = "default_status")]
    pub status: AttendanceStatus,
}

fn default_status() -> AttendanceStatus {
    AttendanceStatus::Present
}

/// PUT /api/hr/attendance/{id}
#[derive(Debug, Serialize, Deserialize)]
pub struct AttendanceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_out: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AttendanceStatus>,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}
