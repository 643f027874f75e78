//! Department repository

use chrono::Utc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult, record_key};
use crate::db::models::{Department, DepartmentUpdate};

const TABLE: &str = "department";

#[derive(Clone)]
pub struct DepartmentRepository {
    base: BaseRepository,
}

impl DepartmentRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Department>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM department ORDER BY name ASC")
            .await?;
        let departments: Vec<Department> = result.take(0)?;
        Ok(departments)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Department>> {
        let department: Option<Department> =
            self.base.db().select((TABLE, record_key(TABLE, id))).await?;
        Ok(department)
    }

    pub async fn create(&self, department: Department) -> RepoResult<Department> {
        let created: Option<Department> =
            self.base.db().create(TABLE).content(department).await?;
        created.ok_or_else(|| RepoError::Database("department insert returned nothing".into()))
    }

    pub async fn update(
        &self,
        id: &str,
        mut patch: DepartmentUpdate,
    ) -> RepoResult<Option<Department>> {
        patch.updated_at = Some(Utc::now());
        let updated: Option<Department> = self
            .base
            .db()
            .update((TABLE, record_key(TABLE, id)))
            .merge(patch)
            .await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> RepoResult<Option<Department>> {
        let deleted: Option<Department> =
            self.base.db().delete((TABLE, record_key(TABLE, id))).await?;
        Ok(deleted)
    }
}
