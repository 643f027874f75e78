//! Attendance repository

use chrono::{NaiveDate, Utc};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, CountRow, RepoError, RepoResult, record_key};
use crate::common::PageParams;
use crate::db::models::{Attendance, AttendanceUpdate};

const TABLE: &str = "attendance";

#[derive(Debug, Default)]
pub struct AttendanceFilter {
    pub employee: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct AttendanceRepository {
    base: BaseRepository,
}

impl AttendanceRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_page(
        &self,
        filter: AttendanceFilter,
        params: PageParams,
    ) -> RepoResult<(Vec<Attendance>, u64)> {
        let mut clauses: Vec<&str> = Vec::new();
        if filter.employee.is_some() {
            clauses.push("employee = type::thing('employee', $employee)");
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
            "SELECT * FROM attendance{w} ORDER BY date DESC LIMIT $limit START $start;
             SELECT count() AS total FROM attendance{w} GROUP ALL;",
            w = where_sql
        );

        let mut query = self
            .base
            .db()
            .query(sql)
            .bind(("limit", params.limit))
            .bind(("start", params.start()));
        if let Some(employee) = filter.employee {
            query = query.bind(("employee", record_key("employee", &employee).to_string()));
        }
        if let Some(from) = filter.from {
            query = query.bind(("from", from));
        }
        if let Some(to) = filter.to {
            query = query.bind(("to", to));
        }

        let mut result = query.await?;
        let records: Vec<Attendance> = result.take(0)?;
        let total: Option<CountRow> = result.take(1)?;
        Ok((records, total.map(|t| t.total).unwrap_or(0)))
    }

    /// The single record for an employee on a given day, if any
    pub async fn find_for_day(
        &self,
        employee: &str,
        date: NaiveDate,
    ) -> RepoResult<Option<Attendance>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM attendance
                 WHERE employee = type::thing('employee', $employee) AND date = $date
                 LIMIT 1",
            )
            .bind(("employee", record_key("employee", employee).to_string()))
            .bind(("date", date))
            .await?;
        let record: Option<Attendance> = result.take(0)?;
        Ok(record)
    }

    pub async fn create(&self, attendance: Attendance) -> RepoResult<Attendance> {
        let created: Option<Attendance> =
            self.base.db().create(TABLE).content(attendance).await?;
        created.ok_or_else(|| RepoError::Database("attendance insert returned nothing".into()))
    }

    /// Close an open record with the check-out time and derived hours
    pub async fn close(
        &self,
        id: &str,
        check_out: chrono::DateTime<Utc>,
        total_hours: f64,
    ) -> RepoResult<Option<Attendance>> {
        let key = record_key(TABLE, id).to_string();
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE type::thing('attendance', $id)
                 SET check_out = $check_out, total_hours = $total_hours, updated_at = $now
                 RETURN AFTER",
            )
            .bind(("id", key))
            .bind(("check_out", check_out))
            .bind(("total_hours", total_hours))
            .bind(("now", Utc::now()))
            .await?;
        let record: Option<Attendance> = result.take(0)?;
        Ok(record)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Attendance>> {
        let record: Option<Attendance> =
            self.base.db().select((TABLE, record_key(TABLE, id))).await?;
        Ok(record)
    }

    pub async fn update(
        &self,
        id: &str,
        mut patch: AttendanceUpdate,
    ) -> RepoResult<Option<Attendance>> {
        patch.updated_at = Some(Utc::now());
        let updated: Option<Attendance> = self
            .base
            .db()
            .update((TABLE, record_key(TABLE, id)))
            .merge(patch)
            .await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> RepoResult<Option<Attendance>> {
        let deleted: Option<Attendance> =
            self.base.db().delete((TABLE, record_key(TABLE, id))).await?;
        Ok(deleted)
    }
}
