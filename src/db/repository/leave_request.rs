//! Leave request repository

use chrono::Utc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, CountRow, RepoError, RepoResult, record_key};
use crate::common::PageParams;
use crate::db::models::{LeaveRequest, LeaveStatus};

const TABLE: &str = "leave_request";

#[derive(Debug, Default)]
pub struct LeaveFilter {
    pub employee: Option<String>,
    pub status: Option<LeaveStatus>,
}

#[derive(Clone)]
pub struct LeaveRequestRepository {
    base: BaseRepository,
}

impl LeaveRequestRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_page(
        &self,
        filter: LeaveFilter,
        params: PageParams,
    ) -> RepoResult<(Vec<LeaveRequest>, u64)> {
        let mut clauses: Vec<&str> = Vec::new();
        if filter.employee.is_some() {
            clauses.push("employee = type::thing('employee', $employee)");
        }
        if filter.status.is_some() {
            clauses.push("status = $status");
        }
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let sql = format!(
            "SELECT * FROM leave_request{w} ORDER BY created_at DESC LIMIT $limit START $start;
             SELECT count() AS total FROM leave_request{w} GROUP ALL;",
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
        if let Some(status) = filter.status {
            query = query.bind(("status", status));
        }

        let mut result = query.await?;
        let requests: Vec<LeaveRequest> = result.take(0)?;
        let total: Option<CountRow> = result.take(1)?;
        Ok((requests, total.map(|t| t.total).unwrap_or(0)))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<LeaveRequest>> {
        let request: Option<LeaveRequest> =
            self.base.db().select((TABLE, record_key(TABLE, id))).await?;
        Ok(request)
    }

    pub async fn create(&self, request: LeaveRequest) -> RepoResult<LeaveRequest> {
        let created: Option<LeaveRequest> =
            self.base.db().create(TABLE).content(request).await?;
        created.ok_or_else(|| RepoError::Database("leave request insert returned nothing".into()))
    }

    /// Decide a pending request. Returns `None` when the request is not
    /// pending anymore or does not exist.
    pub async fn decide(
        &self,
        id: &str,
        status: LeaveStatus,
        approver: &str,
    ) -> RepoResult<Option<LeaveRequest>> {
        let key = record_key(TABLE, id).to_string();
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE type::thing('leave_request', $id)
                 SET status = $status,
                     approved_by = type::thing('user', $approver),
                     approved_date = $now,
                     updated_at = $now
                 WHERE status = 'pending'
                 RETURN AFTER",
            )
            .bind(("id", key))
            .bind(("status", status))
            .bind(("approver", record_key("user", approver).to_string()))
            .bind(("now", Utc::now()))
            .await?;
        let request: Option<LeaveRequest> = result.take(0)?;
        Ok(request)
    }

    pub async fn delete(&self, id: &str) -> RepoResult<Option<LeaveRequest>> {
        let deleted: Option<LeaveRequest> =
            self.base.db().delete((TABLE, record_key(TABLE, id))).await?;
        Ok(deleted)
    }
}
