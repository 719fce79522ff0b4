//! PostgreSQL implementation of the structure repository.
//!
//! All writes go through bulk statements (`QueryBuilder` multi-row
//! upserts, `UNNEST`-based association inserts) inside one transaction
//! per `synchronize` or `wipe` call. The transaction is the only
//! concurrency boundary; no in-process locks are taken.

mod queries;
mod resolver;
mod rows;
mod upsert;

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{debug, instrument};
use uuid::Uuid;

use structure_sync_shared::{
    CompleteStructure, NaturalKey, Sink, Source, StructureLevel, ThingNode,
};

use crate::errors::StructureRepositoryError;
use crate::interfaces::StructureRepository;
use crate::sorter::sort_thing_nodes;

use self::resolver::{EntityTable, fetch_existing_ids};

/// Default maximum number of natural keys resolved per query, chosen
/// to stay well below the store's bind-parameter ceiling.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Tables cleared by `wipe`, association tables first to honor the
/// foreign-key constraints.
const WIPE_ORDER: [&str; 6] = [
    "thingnode_source_association",
    "thingnode_sink_association",
    "source",
    "sink",
    "thing_node",
    "element_type",
];

/// PostgreSQL-backed structure repository.
pub struct PostgresStructureRepository {
    pool: sqlx::PgPool,
    batch_size: usize,
}

impl PostgresStructureRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self::with_batch_size(pool, DEFAULT_BATCH_SIZE)
    }

    /// Creates a repository with a custom resolver/upsert batch size.
    /// The parameter-count ceiling is deployment specific, so it is
    /// configuration rather than a constant.
    pub fn with_batch_size(pool: sqlx::PgPool, batch_size: usize) -> Self {
        Self { pool, batch_size }
    }
}

#[async_trait]
impl StructureRepository for PostgresStructureRepository {
    #[instrument(skip_all, fields(
        element_types = structure.element_types.len(),
        thing_nodes = structure.thing_nodes.len(),
        sources = structure.sources.len(),
        sinks = structure.sinks.len(),
    ))]
    async fn synchronize(
        &self,
        structure: &CompleteStructure,
    ) -> Result<(), StructureRepositoryError> {
        structure.validate()?;

        let mut tx = self.pool.begin().await?;

        let element_type_keys: Vec<NaturalKey> = structure
            .element_types
            .iter()
            .map(|et| et.natural_key())
            .collect();
        let thing_node_keys: Vec<NaturalKey> = structure
            .thing_nodes
            .iter()
            .map(|tn| tn.natural_key())
            .collect();

        // Sorting adopts stored surrogate ids, so existing nodes are
        // resolved up front.
        let existing_thing_nodes = fetch_existing_ids(
            &mut tx,
            EntityTable::ThingNode,
            &thing_node_keys,
            self.batch_size,
        )
        .await?;

        upsert::upsert_element_types(&mut tx, &structure.element_types, self.batch_size).await?;
        // Re-resolve to pick up freshly assigned surrogate ids.
        let element_type_ids = fetch_existing_ids(
            &mut tx,
            EntityTable::ElementType,
            &element_type_keys,
            self.batch_size,
        )
        .await?;

        let sorted_nodes = sort_thing_nodes(&structure.thing_nodes, &existing_thing_nodes);
        upsert::upsert_thing_nodes(&mut tx, &sorted_nodes, &element_type_ids, self.batch_size)
            .await?;
        let thing_node_ids = fetch_existing_ids(
            &mut tx,
            EntityTable::ThingNode,
            &thing_node_keys,
            self.batch_size,
        )
        .await?;

        upsert::upsert_sources(&mut tx, &structure.sources, &thing_node_ids, self.batch_size)
            .await?;
        upsert::upsert_sinks(&mut tx, &structure.sinks, &thing_node_ids, self.batch_size).await?;

        tx.commit().await?;
        debug!("Completed structure synchronization");
        Ok(())
    }

    async fn wipe(&self) -> Result<(), StructureRepositoryError> {
        let mut tx = self.pool.begin().await?;
        for table in WIPE_ORDER {
            debug!(table, "Deleting all records");
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn is_empty(&self) -> Result<bool, StructureRepositoryError> {
        let empty: bool = sqlx::query_scalar(
            "SELECT NOT EXISTS (SELECT 1 FROM element_type) \
             AND NOT EXISTS (SELECT 1 FROM thing_node) \
             AND NOT EXISTS (SELECT 1 FROM source) \
             AND NOT EXISTS (SELECT 1 FROM sink)",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(empty)
    }

    async fn get_children(
        &self,
        parent_id: Option<Uuid>,
    ) -> Result<StructureLevel, StructureRepositoryError> {
        queries::get_children(&self.pool, parent_id).await
    }

    async fn get_thing_node(&self, id: Uuid) -> Result<ThingNode, StructureRepositoryError> {
        queries::get_thing_node(&self.pool, id).await
    }

    async fn get_source(&self, id: Uuid) -> Result<Source, StructureRepositoryError> {
        queries::get_source(&self.pool, id).await
    }

    async fn get_sink(&self, id: Uuid) -> Result<Sink, StructureRepositoryError> {
        queries::get_sink(&self.pool, id).await
    }

    async fn get_thing_nodes_by_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, ThingNode>, StructureRepositoryError> {
        queries::get_thing_nodes_by_ids(&self.pool, ids, self.batch_size).await
    }

    async fn get_sources_by_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Source>, StructureRepositoryError> {
        queries::get_sources_by_ids(&self.pool, ids, self.batch_size).await
    }

    async fn get_sinks_by_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Sink>, StructureRepositoryError> {
        queries::get_sinks_by_ids(&self.pool, ids, self.batch_size).await
    }

    async fn search_thing_nodes_by_name(
        &self,
        name_query: &str,
    ) -> Result<Vec<ThingNode>, StructureRepositoryError> {
        queries::search_thing_nodes_by_name(&self.pool, name_query).await
    }

    async fn search_sources_by_name(
        &self,
        name_query: &str,
    ) -> Result<Vec<Source>, StructureRepositoryError> {
        queries::search_sources_by_name(&self.pool, name_query).await
    }

    async fn search_sinks_by_name(
        &self,
        name_query: &str,
    ) -> Result<Vec<Sink>, StructureRepositoryError> {
        queries::search_sinks_by_name(&self.pool, name_query).await
    }
}
