use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

use structure_sync_repository::{MIGRATOR, PostgresStructureRepository, StructureRepository};

use crate::config::Config;
use crate::errors::ServiceError;

/// `Dependencies` holds the wired components of the service.
pub struct Dependencies {
    pub repository: Arc<dyn StructureRepository>,
}

impl Dependencies {
    /// Connects the store, applies pending migrations and builds the
    /// repository with the configured batch size.
    pub async fn new(config: &Config) -> Result<Self, ServiceError> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(&config.database_url)
            .await?;

        MIGRATOR.run(&pool).await?;
        info!("Database schema is up to date");

        let repository = PostgresStructureRepository::with_batch_size(pool, config.batch_size);
        Ok(Dependencies {
            repository: Arc::new(repository),
        })
    }
}
