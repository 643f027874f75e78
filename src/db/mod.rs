//! Database layer
//!
//! Embedded SurrealDB: RocksDB on disk in production, in-memory for tests.

pub mod models;
pub mod repository;
pub mod schema;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

const NAMESPACE: &str = "erp";
const DATABASE: &str = "main";

/// Open the on-disk database under `data_dir` and apply the schema
pub async fn connect(data_dir: &str) -> Result<Surreal<Db>, surrealdb::Error> {
    let path = format!("{}/erp.db", data_dir);
    let db = Surreal::new::<RocksDb>(path.as_str()).await?;
    db.use_ns(NAMESPACE).use_db(DATABASE).await?;
    schema::apply(&db).await?;
    tracing::info!(path = %path, "Database ready");
    Ok(db)
}

/// Open a fresh in-memory database (integration tests)
pub async fn connect_memory() -> Result<Surreal<Db>, surrealdb::Error> {
    let db = Surreal::new::<Mem>(()).await?;
    db.use_ns(NAMESPACE).use_db(DATABASE).await?;
    schema::apply(&db).await?;
    Ok(db)
}
