//! Payroll repository

use chrono::Utc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, CountRow, RepoError, RepoResult, record_key};
use crate::common::PageParams;
use crate::db::models::{Payroll, PayrollUpdate};

const TABLE: &str = "payroll";

#[derive(Debug, Default)]
pub struct PayrollFilter {
    pub employee: Option<String>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

#[derive(Clone)]
pub struct PayrollRepository {
    base: BaseRepository,
}

impl PayrollRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_page(
        &self,
        filter: PayrollFilter,
        params: PageParams,
    ) -> RepoResult<(Vec<Payroll>, u64)> {
        let mut clauses: Vec<&str> = Vec::new();
        if filter.employee.is_some() {
            clauses.push("employee = type::thing('employee', $employee)");
        }
        if filter.month.is_some() {
            clauses.push("month = $month");
        }
        if filter.year.is_some() {
            clauses.push("year = $year");
        }
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let sql = format!(
            "SELECT * FROM payroll{w} ORDER BY year DESC, month DESC LIMIT $limit START $start;
             SELECT count() AS total FROM payroll{w} GROUP ALL;",
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
        if let Some(month) = filter.month {
            query = query.bind(("month", month));
        }
        if let Some(year) = filter.year {
            query = query.bind(("year", year));
        }

        let mut result = query.await?;
        let payrolls: Vec<Payroll> = result.take(0)?;
        let total: Option<CountRow> = result.take(1)?;
        Ok((payrolls, total.map(|t| t.total).unwrap_or(0)))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Payroll>> {
        let payroll: Option<Payroll> =
            self.base.db().select((TABLE, record_key(TABLE, id))).await?;
        Ok(payroll)
    }

    pub async fn create(&self, payroll: Payroll) -> RepoResult<Payroll> {
        let created: Option<Payroll> = self.base.db().create(TABLE).content(payroll).await?;
        created.ok_or_else(|| RepoError::Database("payroll insert returned nothing".into()))
    }

    pub async fn update(&self, id: &str, mut patch: PayrollUpdate) -> RepoResult<Option<Payroll>> {
        patch.updated_at = Some(Utc::now());
        let updated: Option<Payroll> = self
            .base
            .db()
            .update((TABLE, record_key(TABLE, id)))
            .merge(patch)
            .await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> RepoResult<Option<Payroll>> {
        let deleted: Option<Payroll> =
            self.base.db().delete((TABLE, record_key(TABLE, id))).await?;
        Ok(deleted)
    }
}
