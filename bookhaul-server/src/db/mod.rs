//! Database Module
//!
//! Embedded SurrealDB (RocksDB engine). One namespace/database per
//! installation; the schema in `schema.surql` is applied at startup.

pub mod models;
pub mod repository;

use std::path::Path;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

use repository::{RepoError, RepoResult};

pub const NAMESPACE: &str = "bookhaul";
pub const DATABASE: &str = "main";

const SCHEMA: &str = include_str!("schema.surql");

/// Database service - owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the database at `path` and apply the schema
    pub async fn new(path: &Path) -> RepoResult<Self> {
        let db = Surreal::new::<RocksDb>(path)
            .await
            .map_err(|e| RepoError::Database(format!("Failed to open database: {e}")))?;
        db.use_ns(NAMESPACE).use_db(DATABASE).await?;
        tracing::info!(path = %path.display(), "Database connection established (RocksDB)");

        apply_schema(&db).await?;
        tracing::info!("Database schema applied");

        Ok(Self { db })
    }
}

/// Apply table, field and index definitions
pub async fn apply_schema(db: &Surreal<Db>) -> RepoResult<()> {
    db.query(SCHEMA).await?.check()?;
    Ok(())
}
