//! Error types for the structure synchronization service.
//! Consolidates errors from the repository, document parsing and the
//! surrounding infrastructure.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Repository error: {0}")]
    Repository(#[from] structure_sync_repository::StructureRepositoryError),

    #[error("Parsing error: {0}")]
    Parsing(#[from] structure_sync_shared::ParsingError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}
