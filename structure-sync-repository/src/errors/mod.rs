//! Error types for the structure repository.
//!
//! Low-level store failures are classified on conversion: constraint
//! violations become conflicts, unreachable-store conditions become
//! connection errors, everything else is an update error. Any of these
//! raised inside `synchronize` rolls back the whole transaction.
use thiserror::Error;

use structure_sync_shared::ValidationError;

/// Represents errors that can occur within the structure repository.
#[derive(Debug, Error)]
pub enum StructureRepositoryError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("no record found: {0}")]
    NotFound(String),

    #[error("conflict while writing structure: {0}")]
    Conflict(sqlx::Error),

    #[error("store connection error: {0}")]
    Connection(sqlx::Error),

    #[error("update error: {0}")]
    Update(sqlx::Error),

    #[error("could not decode stored document field: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<sqlx::Error> for StructureRepositoryError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::Database(db_error)
                if db_error.is_unique_violation() || db_error.is_foreign_key_violation() =>
            {
                StructureRepositoryError::Conflict(error)
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => StructureRepositoryError::Connection(error),
            _ => StructureRepositoryError::Update(error),
        }
    }
}
