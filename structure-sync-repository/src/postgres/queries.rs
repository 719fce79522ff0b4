//! Read-side queries consumed by the web layer.

use std::collections::HashMap;

use tracing::debug;
use uuid::Uuid;

use structure_sync_shared::{Sink, Source, StructureLevel, ThingNode};

use crate::errors::StructureRepositoryError;
use crate::postgres::rows::{SinkRow, SourceRow, ThingNodeRow};

const THING_NODE_COLUMNS: &str = "id, external_id, stakeholder_key, name, description, \
     parent_node_id, parent_external_node_id, element_type_id, element_type_external_id, \
     meta_data";

const SOURCE_COLUMNS: &str = "id, external_id, stakeholder_key, name, type, visible, \
     display_path, adapter_key, source_id, ref_key, ref_id, meta_data, preset_filters, \
     passthrough_filters, thing_node_external_ids";

const SINK_COLUMNS: &str = "id, external_id, stakeholder_key, name, type, visible, \
     display_path, adapter_key, sink_id, ref_key, ref_id, meta_data, preset_filters, \
     passthrough_filters, thing_node_external_ids";

/// Fetches one level of the tree for lazy expansion in a UI.
///
/// With no parent id, returns the root nodes with empty source and
/// sink lists. Otherwise returns the direct children of the parent
/// plus the sources and sinks attached to the parent node itself.
pub(crate) async fn get_children(
    pool: &sqlx::PgPool,
    parent_id: Option<Uuid>,
) -> Result<StructureLevel, StructureRepositoryError> {
    let Some(parent_id) = parent_id else {
        let rows: Vec<ThingNodeRow> = sqlx::query_as(&format!(
            "SELECT {THING_NODE_COLUMNS} FROM thing_node WHERE parent_node_id IS NULL"
        ))
        .fetch_all(pool)
        .await?;
        debug!(count = rows.len(), "Fetched root thing nodes");
        return Ok(StructureLevel {
            thing_nodes: rows.into_iter().map(ThingNode::from).collect(),
            sources: Vec::new(),
            sinks: Vec::new(),
        });
    };

    let parent: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM thing_node WHERE id = $1")
        .bind(parent_id)
        .fetch_optional(pool)
        .await?;
    if parent.is_none() {
        return Err(StructureRepositoryError::NotFound(format!(
            "no thing node found for id {parent_id}"
        )));
    }

    let child_rows: Vec<ThingNodeRow> = sqlx::query_as(&format!(
        "SELECT {THING_NODE_COLUMNS} FROM thing_node WHERE parent_node_id = $1"
    ))
    .bind(parent_id)
    .fetch_all(pool)
    .await?;

    let source_rows: Vec<SourceRow> = sqlx::query_as(&format!(
        "SELECT s.{} FROM source s \
         JOIN thingnode_source_association a ON a.source_id = s.id \
         WHERE a.thing_node_id = $1",
        SOURCE_COLUMNS.replace(", ", ", s.")
    ))
    .bind(parent_id)
    .fetch_all(pool)
    .await?;

    let sink_rows: Vec<SinkRow> = sqlx::query_as(&format!(
        "SELECT s.{} FROM sink s \
         JOIN thingnode_sink_association a ON a.sink_id = s.id \
         WHERE a.thing_node_id = $1",
        SINK_COLUMNS.replace(", ", ", s.")
    ))
    .bind(parent_id)
    .fetch_all(pool)
    .await?;

    debug!(
        children = child_rows.len(),
        sources = source_rows.len(),
        sinks = sink_rows.len(),
        parent = %parent_id,
        "Fetched one structure level"
    );

    Ok(StructureLevel {
        thing_nodes: child_rows.into_iter().map(ThingNode::from).collect(),
        sources: source_rows
            .into_iter()
            .map(Source::try_from)
            .collect::<Result<_, _>>()?,
        sinks: sink_rows
            .into_iter()
            .map(Sink::try_from)
            .collect::<Result<_, _>>()?,
    })
}

pub(crate) async fn get_thing_node(
    pool: &sqlx::PgPool,
    id: Uuid,
) -> Result<ThingNode, StructureRepositoryError> {
    let row: Option<ThingNodeRow> = sqlx::query_as(&format!(
        "SELECT {THING_NODE_COLUMNS} FROM thing_node WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(ThingNode::from)
        .ok_or_else(|| StructureRepositoryError::NotFound(format!("no thing node found for id {id}")))
}

pub(crate) async fn get_source(
    pool: &sqlx::PgPool,
    id: Uuid,
) -> Result<Source, StructureRepositoryError> {
    let row: Option<SourceRow> =
        sqlx::query_as(&format!("SELECT {SOURCE_COLUMNS} FROM source WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    match row {
        Some(row) => Ok(Source::try_from(row)?),
        None => Err(StructureRepositoryError::NotFound(format!(
            "no source found for id {id}"
        ))),
    }
}

pub(crate) async fn get_sink(
    pool: &sqlx::PgPool,
    id: Uuid,
) -> Result<Sink, StructureRepositoryError> {
    let row: Option<SinkRow> =
        sqlx::query_as(&format!("SELECT {SINK_COLUMNS} FROM sink WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    match row {
        Some(row) => Ok(Sink::try_from(row)?),
        None => Err(StructureRepositoryError::NotFound(format!(
            "no sink found for id {id}"
        ))),
    }
}

pub(crate) async fn get_thing_nodes_by_ids(
    pool: &sqlx::PgPool,
    ids: &[Uuid],
    batch_size: usize,
) -> Result<HashMap<Uuid, ThingNode>, StructureRepositoryError> {
    let mut mapping: HashMap<Uuid, ThingNode> = HashMap::new();
    if ids.is_empty() {
        return Ok(mapping);
    }
    for id_batch in ids.chunks(batch_size) {
        let rows: Vec<ThingNodeRow> = sqlx::query_as(&format!(
            "SELECT {THING_NODE_COLUMNS} FROM thing_node WHERE id = ANY($1::uuid[])"
        ))
        .bind(id_batch)
        .fetch_all(pool)
        .await?;
        for row in rows {
            mapping.insert(row.id, ThingNode::from(row));
        }
    }
    if mapping.is_empty() {
        return Err(StructureRepositoryError::NotFound(
            "none of the requested thing node ids exist".to_string(),
        ));
    }
    Ok(mapping)
}

pub(crate) async fn get_sources_by_ids(
    pool: &sqlx::PgPool,
    ids: &[Uuid],
    batch_size: usize,
) -> Result<HashMap<Uuid, Source>, StructureRepositoryError> {
    let mut mapping: HashMap<Uuid, Source> = HashMap::new();
    if ids.is_empty() {
        return Ok(mapping);
    }
    for id_batch in ids.chunks(batch_size) {
        let rows: Vec<SourceRow> = sqlx::query_as(&format!(
            "SELECT {SOURCE_COLUMNS} FROM source WHERE id = ANY($1::uuid[])"
        ))
        .bind(id_batch)
        .fetch_all(pool)
        .await?;
        for row in rows {
            mapping.insert(row.id, Source::try_from(row)?);
        }
    }
    if mapping.is_empty() {
        return Err(StructureRepositoryError::NotFound(
            "none of the requested source ids exist".to_string(),
        ));
    }
    Ok(mapping)
}

pub(crate) async fn get_sinks_by_ids(
    pool: &sqlx::PgPool,
    ids: &[Uuid],
    batch_size: usize,
) -> Result<HashMap<Uuid, Sink>, StructureRepositoryError> {
    let mut mapping: HashMap<Uuid, Sink> = HashMap::new();
    if ids.is_empty() {
        return Ok(mapping);
    }
    for id_batch in ids.chunks(batch_size) {
        let rows: Vec<SinkRow> = sqlx::query_as(&format!(
            "SELECT {SINK_COLUMNS} FROM sink WHERE id = ANY($1::uuid[])"
        ))
        .bind(id_batch)
        .fetch_all(pool)
        .await?;
        for row in rows {
            mapping.insert(row.id, Sink::try_from(row)?);
        }
    }
    if mapping.is_empty() {
        return Err(StructureRepositoryError::NotFound(
            "none of the requested sink ids exist".to_string(),
        ));
    }
    Ok(mapping)
}

pub(crate) async fn search_thing_nodes_by_name(
    pool: &sqlx::PgPool,
    name_query: &str,
) -> Result<Vec<ThingNode>, StructureRepositoryError> {
    let rows: Vec<ThingNodeRow> = sqlx::query_as(&format!(
        "SELECT {THING_NODE_COLUMNS} FROM thing_node WHERE name ILIKE $1"
    ))
    .bind(format!("%{name_query}%"))
    .fetch_all(pool)
    .await?;
    debug!(count = rows.len(), query = name_query, "Searched thing nodes by name");
    Ok(rows.into_iter().map(ThingNode::from).collect())
}

pub(crate) async fn search_sources_by_name(
    pool: &sqlx::PgPool,
    name_query: &str,
) -> Result<Vec<Source>, StructureRepositoryError> {
    let rows: Vec<SourceRow> = sqlx::query_as(&format!(
        "SELECT {SOURCE_COLUMNS} FROM source WHERE name ILIKE $1"
    ))
    .bind(format!("%{name_query}%"))
    .fetch_all(pool)
    .await?;
    debug!(count = rows.len(), query = name_query, "Searched sources by name");
    rows.into_iter()
        .map(|row| Source::try_from(row).map_err(StructureRepositoryError::from))
        .collect()
}

pub(crate) async fn search_sinks_by_name(
    pool: &sqlx::PgPool,
    name_query: &str,
) -> Result<Vec<Sink>, StructureRepositoryError> {
    let rows: Vec<SinkRow> = sqlx::query_as(&format!(
        "SELECT {SINK_COLUMNS} FROM sink WHERE name ILIKE $1"
    ))
    .bind(format!("%{name_query}%"))
    .fetch_all(pool)
    .await?;
    debug!(count = rows.len(), query = name_query, "Searched sinks by name");
    rows.into_iter()
        .map(|row| Sink::try_from(row).map_err(StructureRepositoryError::from))
        .collect()
}
