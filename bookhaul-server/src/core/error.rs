use thiserror::Error;

/// Startup and lifecycle errors
///
/// Request handlers return [`crate::utils::AppError`]; `ServerError` only
/// covers booting, binding and shutting down the process.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl From<crate::db::repository::RepoError> for ServerError {
    fn from(e: crate::db::repository::RepoError) -> Self {
        ServerError::Database(e.to_string())
    }
}

impl From<surrealdb::Error> for ServerError {
    fn from(e: surrealdb::Error) -> Self {
        ServerError::Database(e.to_string())
    }
}

/// Result type for server lifecycle operations
pub type Result<T> = std::result::Result<T, ServerError>;
