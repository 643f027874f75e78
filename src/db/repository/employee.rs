//! Employee repository

use chrono::Utc;
use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use uuid::Uuid;

use super::{BaseRepository, CountRow, RepoError, RepoResult, record_key};
use crate::common::PageParams;
use crate::db::models::{Employee, EmployeeStatus, EmployeeUpdate, User};

const TABLE: &str = "employee";

#[derive(Debug, Default)]
pub struct EmployeeFilter {
    pub status: Option<EmployeeStatus>,
    pub department: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DepartmentHeadcount {
    pub department: Option<String>,
    pub count: u64,
}

#[derive(Clone)]
pub struct EmployeeRepository {
    base: BaseRepository,
}

impl EmployeeRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_page(
        &self,
        filter: EmployeeFilter,
        params: PageParams,
    ) -> RepoResult<(Vec<Employee>, u64)> {
        let mut clauses: Vec<&str> = Vec::new();
        if filter.status.is_some() {
            clauses.push("status = $status");
        }
        if filter.department.is_some() {
            clauses.push("department = type::thing('department', $department)");
        }
        if filter.search.is_some() {
            clauses.push(
                "(string::lowercase(first_name) CONTAINS string::lowercase($search)
                  OR string::lowercase(last_name) CONTAINS string::lowercase($search)
                  OR string::lowercase(email) CONTAINS string::lowercase($search))",
            );
        }
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let sql = format!(
            "SELECT * FROM employee{w} ORDER BY employee_id ASC LIMIT $limit START $start;
             SELECT count() AS total FROM employee{w} GROUP ALL;",
            w = where_sql
        );

        let mut query = self
            .base
            .db()
            .query(sql)
            .bind(("limit", params.limit))
            .bind(("start", params.start()));
        if let Some(status) = filter.status {
            query = query.bind(("status", status));
        }
        if let Some(department) = filter.department {
            query = query.bind((
                "department",
                record_key("department", &department).to_string(),
            ));
        }
        if let Some(search) = filter.search {
            query = query.bind(("search", search));
        }

        let mut result = query.await?;
        let employees: Vec<Employee> = result.take(0)?;
        let total: Option<CountRow> = result.take(1)?;
        Ok((employees, total.map(|t| t.total).unwrap_or(0)))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Employee>> {
        let employee: Option<Employee> =
            self.base.db().select((TABLE, record_key(TABLE, id))).await?;
        Ok(employee)
    }

    pub async fn create(&self, employee: Employee) -> RepoResult<Employee> {
        let created: Option<Employee> = self.base.db().create(TABLE).content(employee).await?;
        created.ok_or_else(|| RepoError::Database("employee insert returned nothing".into()))
    }

    /// Create an employee and its login user atomically
    ///
    /// `employee.user` must already point at the pre-generated user key so
    /// the link is consistent inside the transaction.
    pub async fn create_with_user(
        &self,
        user_key: String,
        user: User,
        employee: Employee,
    ) -> RepoResult<Employee> {
        let mut result = self
            .base
            .db()
            .query(
                "BEGIN TRANSACTION;
                 CREATE type::thing('user', $uid) CONTENT $user;
                 CREATE employee CONTENT $employee;
                 COMMIT TRANSACTION;",
            )
            .bind(("uid", user_key))
            .bind(("user", user))
            .bind(("employee", employee))
            .await?;
        result = result.check()?;

        let created: Option<Employee> = result.take(1)?;
        created.ok_or_else(|| RepoError::Database("employee insert returned nothing".into()))
    }

    pub async fn update(&self, id: &str, mut patch: EmployeeUpdate) -> RepoResult<Option<Employee>> {
        patch.updated_at = Some(Utc::now());
        let updated: Option<Employee> = self
            .base
            .db()
            .update((TABLE, record_key(TABLE, id)))
            .merge(patch)
            .await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> RepoResult<Option<Employee>> {
        let deleted: Option<Employee> =
            self.base.db().delete((TABLE, record_key(TABLE, id))).await?;
        Ok(deleted)
    }

    /// Headcount rollups for HR statistics
    pub async fn statistics(&self) -> RepoResult<(u64, u64, u64, Vec<DepartmentHeadcount>)> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT count() AS total FROM employee GROUP ALL;
                 SELECT count() AS total FROM employee WHERE status = 'active' GROUP ALL;
                 SELECT count() AS total FROM employee WHERE status = 'on_leave' GROUP ALL;
                 SELECT department.name AS department, count() AS count
                 FROM employee GROUP BY department;",
            )
            .await?;
        let total: Option<CountRow> = result.take(0)?;
        let active: Option<CountRow> = result.take(1)?;
        let on_leave: Option<CountRow> = result.take(2)?;
        let by_department: Vec<DepartmentHeadcount> = result.take(3)?;
        Ok((
            total.map(|t| t.total).unwrap_or(0),
            active.map(|t| t.total).unwrap_or(0),
            on_leave.map(|t| t.total).unwrap_or(0),
            by_department,
        ))
    }
}

/// Generate a fresh user record key for [`EmployeeRepository::create_with_user`]
pub fn new_user_key() -> String {
    Uuid::new_v4().simple().to_string()
}
