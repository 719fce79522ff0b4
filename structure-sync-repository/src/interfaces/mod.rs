//! This module defines the `StructureRepository` trait, the interface
//! for synchronizing a structure document into the underlying store and
//! for the read-side queries consumed by the web layer.
use std::collections::HashMap;

use uuid::Uuid;

use structure_sync_shared::{CompleteStructure, Sink, Source, StructureLevel, ThingNode};

use crate::errors::StructureRepositoryError;

/// A trait that defines the interface for the structure store.
///
/// Implementors provide atomic full-document synchronization, full
/// wipe, emptiness checks and the read-side query API.
#[async_trait::async_trait]
pub trait StructureRepository: Send + Sync {
    /// Writes a complete structure document, creating or updating
    /// records by natural key.
    ///
    /// Runs inside a single transaction: validation, batched
    /// resolution of existing records, element-type upsert, hierarchy
    /// sorting plus thing-node upsert, and source/sink upsert with
    /// association reconciliation. Any failure rolls back everything.
    async fn synchronize(
        &self,
        structure: &CompleteStructure,
    ) -> Result<(), StructureRepositoryError>;

    /// Deletes all structure data, association tables first to honor
    /// foreign-key constraints.
    async fn wipe(&self) -> Result<(), StructureRepositoryError>;

    /// True iff all four entity tables are empty.
    async fn is_empty(&self) -> Result<bool, StructureRepositoryError>;

    /// One level of the tree.
    ///
    /// With `None`, returns the root thing nodes with empty source and
    /// sink lists. Otherwise returns the direct children of the given
    /// node plus the sources and sinks attached to the node itself;
    /// fails with `NotFound` when the node does not exist.
    async fn get_children(
        &self,
        parent_id: Option<Uuid>,
    ) -> Result<StructureLevel, StructureRepositoryError>;

    async fn get_thing_node(&self, id: Uuid) -> Result<ThingNode, StructureRepositoryError>;

    async fn get_source(&self, id: Uuid) -> Result<Source, StructureRepositoryError>;

    async fn get_sink(&self, id: Uuid) -> Result<Sink, StructureRepositoryError>;

    /// Batched multi-id fetch. Fails with `NotFound` only when `ids` is
    /// non-empty and no record matched; individually missing ids are
    /// simply absent from the result map.
    async fn get_thing_nodes_by_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, ThingNode>, StructureRepositoryError>;

    async fn get_sources_by_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Source>, StructureRepositoryError>;

    async fn get_sinks_by_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Sink>, StructureRepositoryError>;

    /// Case-insensitive substring search over the name field.
    async fn search_thing_nodes_by_name(
        &self,
        name_query: &str,
    ) -> Result<Vec<ThingNode>, StructureRepositoryError>;

    async fn search_sources_by_name(
        &self,
        name_query: &str,
    ) -> Result<Vec<Source>, StructureRepositoryError>;

    async fn search_sinks_by_name(
        &self,
        name_query: &str,
    ) -> Result<Vec<Sink>, StructureRepositoryError>;
}
