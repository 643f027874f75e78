use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::{JwtService, Role};
use crate::core::Config;
use crate::db;
use crate::db::models::User;
use crate::db::repository::UserRepository;

/// Shared application state, cheap to clone
///
/// Holds the embedded database handle and the JWT service. Handlers get a
/// clone through axum's `State` extractor.
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    /// Initialize persistent state: open the database under
    /// `config.data_dir`, apply the schema and seed the admin account
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        let db = db::connect(&config.data_dir).await?;
        let state = Self {
            config: config.clone(),
            db,
            jwt_service: Arc::new(JwtService::with_config(config.jwt.clone())),
        };
        state.ensure_admin().await?;
        Ok(state)
    }

    /// In-memory state for tests
    pub async fn initialize_in_memory(config: &Config) -> anyhow::Result<Self> {
        let db = db::connect_memory().await?;
        let state = Self {
            config: config.clone(),
            db,
            jwt_service: Arc::new(JwtService::with_config(config.jwt.clone())),
        };
        state.ensure_admin().await?;
        Ok(state)
    }

    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// Seed the admin account from ADMIN_EMAIL / ADMIN_PASSWORD when no
    /// admin exists yet. A no-op otherwise.
    async fn ensure_admin(&self) -> anyhow::Result<()> {
        let (Some(email), Some(password)) = (
            self.config.admin_email.clone(),
            self.config.admin_password.clone(),
        ) else {
            return Ok(());
        };

        let users = UserRepository::new(self.db.clone());
        if users.admin_exists().await? {
            return Ok(());
        }

        let now = chrono::Utc::now();
        let user = User {
            id: None,
            name: "Administrator".into(),
            email: email.clone(),
            password: User::hash_password(&password)
                .map_err(|e| anyhow::anyhow!("password hash failed: {e}"))?,
            role: Role::Admin,
            notification_preferences: Default::default(),
            created_at: now,
            updated_at: now,
        };
        users.create(user).await?;
        tracing::info!(email = %email, "seeded admin account");
        Ok(())
    }
}
