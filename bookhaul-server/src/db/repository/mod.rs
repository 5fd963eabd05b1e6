//! Repository Module
//!
//! CRUD and conditional updates for the SurrealDB tables.

pub mod book;
pub mod chat;
pub mod order;
pub mod review;
pub mod user;

pub use book::BookRepository;
pub use chat::ChatRepository;
pub use order::OrderRepository;
pub use review::ReviewRepository;
pub use user::UserRepository;

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use thiserror::Error;

use crate::utils::{AppError, ErrorCode};

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// A UNIQUE index rejected the write
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Transaction lost a write race and was rolled back
    #[error("Write conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        let msg = err.to_string();
        let lower = msg.to_lowercase();
        if lower.contains("already contains") {
            RepoError::Duplicate(msg)
        } else if lower.contains("conflict") || lower.contains("can be retried") {
            RepoError::Conflict(msg)
        } else {
            RepoError::Database(msg)
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Conflict(msg) | RepoError::Database(msg) => {
                tracing::error!(target: "database", error = %msg, "Database error occurred");
                AppError::database(msg)
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: "table:key" everywhere
// =============================================================================
//
// Path parameters may carry either the full id ("book:abc") or the bare
// key ("abc"); `parse_id` normalizes both into a RecordId of the expected
// table and rejects ids of any other table.

/// Parse a path/body id for `table`
pub fn parse_id(table: &str, raw: &str) -> RepoResult<RecordId> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(RepoError::Validation(format!("Empty {table} id")));
    }

    if let Some(rest) = raw.strip_prefix(table).and_then(|r| r.strip_prefix(':')) {
        if rest.is_empty() {
            return Err(RepoError::Validation(format!("Invalid {table} id: {raw}")));
        }
        return raw
            .parse::<RecordId>()
            .map_err(|_| RepoError::Validation(format!("Invalid {table} id: {raw}")));
    }

    if raw.contains(':') {
        return Err(RepoError::Validation(format!("Invalid {table} id: {raw}")));
    }

    Ok(RecordId::from_table_key(table, raw))
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
