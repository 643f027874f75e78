//! User repository

use chrono::Utc;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;
use uuid::Uuid;

use super::{BaseRepository, CountRow, RepoError, RepoResult, record_key};
use crate::auth::Role;
use crate::common::PageParams;
use crate::db::models::{Customer, CustomerStatus, CustomerType, User, UserUpdate};

const TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_page(&self, params: PageParams) -> RepoResult<(Vec<User>, u64)> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM user ORDER BY created_at DESC LIMIT $limit START $start;
                 SELECT count() AS total FROM user GROUP ALL;",
            )
            .bind(("limit", params.limit))
            .bind(("start", params.start()))
            .await?;

        let users: Vec<User> = result.take(0)?;
        let total: Option<CountRow> = result.take(1)?;
        Ok((users, total.map(|t| t.total).unwrap_or(0)))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let user: Option<User> = self.base.db().select((TABLE, record_key(TABLE, id))).await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email.to_string()))
            .await?;
        let user: Option<User> = result.take(0)?;
        Ok(user)
    }

    pub async fn admin_exists(&self) -> RepoResult<bool> {
        let mut result = self
            .base
            .db()
            .query("SELECT count() AS total FROM user WHERE role = 'admin' GROUP ALL")
            .await?;
        let row: Option<CountRow> = result.take(0)?;
        Ok(row.map(|r| r.total > 0).unwrap_or(false))
    }

    /// Insert a user; a `customer`-role user also gets its linked customer
    /// profile in the same transaction.
    pub async fn create(&self, user: User) -> RepoResult<User> {
        if user.role == Role::Customer {
            return self.create_with_customer(user).await;
        }

        let created: Option<User> = self.base.db().create(TABLE).content(user).await?;
        created.ok_or_else(|| RepoError::Database("user insert returned nothing".into()))
    }

    async fn create_with_customer(&self, user: User) -> RepoResult<User> {
        let user_key = Uuid::new_v4().simple().to_string();
        let now = Utc::now();
        let customer = Customer {
            id: None,
            user: Some(RecordId::from_table_key(TABLE, user_key.clone())),
            name: user.name.clone(),
            email: user.email.clone(),
            phone: None,
            company: None,
            customer_type: CustomerType::Individual,
            status: CustomerStatus::Active,
            address: None,
            notes: None,
            assigned_to: None,
            created_at: now,
            updated_at: now,
        };

        let mut result = self
            .base
            .db()
            .query(
                "BEGIN TRANSACTION;
                 CREATE type::thing('user', $uid) CONTENT $user;
                 CREATE customer CONTENT $customer;
                 COMMIT TRANSACTION;",
            )
            .bind(("uid", user_key))
            .bind(("user", user))
            .bind(("customer", customer))
            .await?;
        result = result.check()?;

        let created: Option<User> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("user insert returned nothing".into()))
    }

    pub async fn update(&self, id: &str, mut patch: UserUpdate) -> RepoResult<Option<User>> {
        patch.updated_at = Some(Utc::now());
        let updated: Option<User> = self
            .base
            .db()
            .update((TABLE, record_key(TABLE, id)))
            .merge(patch)
            .await?;
        Ok(updated)
    }

    /// Swap the stored password hash
    pub async fn set_password(&self, id: &str, password_hash: String) -> RepoResult<Option<User>> {
        let key = record_key(TABLE, id).to_string();
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE type::thing('user', $id)
                 SET password = $password, updated_at = $now
                 RETURN AFTER",
            )
            .bind(("id", key))
            .bind(("password", password_hash))
            .bind(("now", Utc::now()))
            .await?;
        let updated: Option<User> = result.take(0)?;
        Ok(updated)
    }

    /// Delete a user and any customer profile linked to it, atomically
    pub async fn delete_with_cascade(&self, id: &str) -> RepoResult<Option<User>> {
        let key = record_key(TABLE, id).to_string();
        let mut result = self
            .base
            .db()
            .query(
                "BEGIN TRANSACTION;
                 DELETE type::thing('user', $id) RETURN BEFORE;
                 DELETE customer WHERE user = type::thing('user', $id);
                 COMMIT TRANSACTION;",
            )
            .bind(("id", key))
            .await?;
        result = result.check()?;

        let deleted: Option<User> = result.take(0)?;
        Ok(deleted)
    }
}
