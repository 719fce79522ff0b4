//! Idempotent create-or-update writes, one routine per entity kind.
//!
//! All writes are bulk statements executed inside the caller's
//! transaction: multi-row `INSERT .. ON CONFLICT (external_id,
//! stakeholder_key) DO UPDATE` with the surrogate id excluded from the
//! update set, so ids and natural keys never change once assigned.
//! Source and sink upserts additionally reconcile the many-to-many
//! association to thing nodes by deleting all existing rows for the
//! written entities and re-inserting the declared set in bulk.

use std::collections::HashMap;

use serde_json::Value;
use sqlx::{Postgres, QueryBuilder};
use tracing::{debug, warn};
use uuid::Uuid;

use structure_sync_shared::{ElementType, NaturalKey, Sink, Source, ThingNode};

use crate::errors::StructureRepositoryError;
use crate::postgres::rows::IdRow;

pub(crate) async fn upsert_element_types(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    element_types: &[ElementType],
    batch_size: usize,
) -> Result<(), StructureRepositoryError> {
    if element_types.is_empty() {
        return Ok(());
    }

    for chunk in element_types.chunks(batch_size) {
        let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO element_type (id, external_id, stakeholder_key, name, description) ",
        );
        query_builder.push_values(chunk, |mut b, et| {
            b.push_bind(et.id)
                .push_bind(&et.external_id)
                .push_bind(&et.stakeholder_key)
                .push_bind(&et.name)
                .push_bind(&et.description);
        });
        query_builder.push(
            " ON CONFLICT (external_id, stakeholder_key) DO UPDATE SET \
             name = EXCLUDED.name, description = EXCLUDED.description",
        );
        query_builder.build().execute(&mut **tx).await?;
    }

    debug!(count = element_types.len(), "Upserted element types");
    Ok(())
}

/// Upserts thing nodes in the level order produced by the sorter.
///
/// The element-type surrogate id is resolved immediately before
/// writing. A node whose element type cannot be resolved is skipped
/// with a warning and left absent from the store for this pass rather
/// than failing the whole transaction.
pub(crate) async fn upsert_thing_nodes(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    sorted_nodes: &[ThingNode],
    element_type_ids: &HashMap<NaturalKey, Uuid>,
    batch_size: usize,
) -> Result<(), StructureRepositoryError> {
    let resolved: Vec<(&ThingNode, Uuid)> = sorted_nodes
        .iter()
        .filter_map(|node| match element_type_ids.get(&node.element_type_key()) {
            Some(element_type_id) => Some((node, *element_type_id)),
            None => {
                warn!(
                    node = %node.external_id,
                    element_type = %node.element_type_external_id,
                    "Element type not found for thing node, skipping update"
                );
                None
            }
        })
        .collect();

    if resolved.is_empty() {
        return Ok(());
    }

    // Chunks preserve the sorted order, so a parent row is always
    // flushed in the same statement as its children or an earlier one.
    for chunk in resolved.chunks(batch_size) {
        let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO thing_node (id, external_id, stakeholder_key, name, description, \
             parent_node_id, parent_external_node_id, element_type_id, \
             element_type_external_id, meta_data) ",
        );
        query_builder.push_values(chunk, |mut b, (node, element_type_id)| {
            b.push_bind(node.id)
                .push_bind(&node.external_id)
                .push_bind(&node.stakeholder_key)
                .push_bind(&node.name)
                .push_bind(&node.description)
                .push_bind(node.parent_node_id)
                .push_bind(&node.parent_external_node_id)
                .push_bind(*element_type_id)
                .push_bind(&node.element_type_external_id)
                .push_bind(&node.meta_data);
        });
        query_builder.push(
            " ON CONFLICT (external_id, stakeholder_key) DO UPDATE SET \
             name = EXCLUDED.name, description = EXCLUDED.description, \
             parent_node_id = EXCLUDED.parent_node_id, \
             parent_external_node_id = EXCLUDED.parent_external_node_id, \
             element_type_id = EXCLUDED.element_type_id, \
             element_type_external_id = EXCLUDED.element_type_external_id, \
             meta_data = EXCLUDED.meta_data",
        );
        query_builder.build().execute(&mut **tx).await?;
    }

    debug!(count = resolved.len(), "Upserted thing nodes");
    Ok(())
}

struct PreparedRow<'a, T> {
    entity: &'a T,
    preset_filters: Value,
    passthrough_filters: Option<Value>,
    thing_node_external_ids: Option<Value>,
}

pub(crate) async fn upsert_sources(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    sources: &[Source],
    thing_node_ids: &HashMap<NaturalKey, Uuid>,
    batch_size: usize,
) -> Result<(), StructureRepositoryError> {
    if sources.is_empty() {
        return Ok(());
    }

    let prepared: Vec<PreparedRow<'_, Source>> = sources
        .iter()
        .map(|src| {
            Ok(PreparedRow {
                entity: src,
                preset_filters: serde_json::to_value(&src.preset_filters)?,
                passthrough_filters: src
                    .passthrough_filters
                    .as_ref()
                    .map(serde_json::to_value)
                    .transpose()?,
                thing_node_external_ids: src
                    .thing_node_external_ids
                    .as_ref()
                    .map(serde_json::to_value)
                    .transpose()?,
            })
        })
        .collect::<Result<_, serde_json::Error>>()?;

    let mut source_ids: HashMap<NaturalKey, Uuid> = HashMap::new();
    for chunk in prepared.chunks(batch_size) {
        let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO source (id, external_id, stakeholder_key, name, type, visible, \
             display_path, adapter_key, source_id, ref_key, ref_id, meta_data, \
             preset_filters, passthrough_filters, thing_node_external_ids) ",
        );
        query_builder.push_values(chunk, |mut b, row| {
            let src = row.entity;
            b.push_bind(src.id)
                .push_bind(&src.external_id)
                .push_bind(&src.stakeholder_key)
                .push_bind(&src.name)
                .push_bind(&src.source_type)
                .push_bind(src.visible)
                .push_bind(&src.display_path)
                .push_bind(&src.adapter_key)
                .push_bind(&src.source_id)
                .push_bind(&src.ref_key)
                .push_bind(&src.ref_id)
                .push_bind(&src.meta_data)
                .push_bind(&row.preset_filters)
                .push_bind(&row.passthrough_filters)
                .push_bind(&row.thing_node_external_ids);
        });
        query_builder.push(
            " ON CONFLICT (external_id, stakeholder_key) DO UPDATE SET \
             name = EXCLUDED.name, type = EXCLUDED.type, visible = EXCLUDED.visible, \
             display_path = EXCLUDED.display_path, adapter_key = EXCLUDED.adapter_key, \
             source_id = EXCLUDED.source_id, ref_key = EXCLUDED.ref_key, \
             ref_id = EXCLUDED.ref_id, meta_data = EXCLUDED.meta_data, \
             preset_filters = EXCLUDED.preset_filters, \
             passthrough_filters = EXCLUDED.passthrough_filters, \
             thing_node_external_ids = EXCLUDED.thing_node_external_ids \
             RETURNING id, external_id, stakeholder_key",
        );
        let rows: Vec<IdRow> = query_builder
            .build_query_as()
            .fetch_all(&mut **tx)
            .await?;
        for row in rows {
            source_ids.insert(NaturalKey::new(row.stakeholder_key, row.external_id), row.id);
        }
    }
    debug!(count = sources.len(), "Upserted sources");

    // Association sets are fully recomputed for every source in the
    // document: one bulk delete, one bulk insert.
    let written_ids: Vec<Uuid> = source_ids.values().copied().collect();
    for chunk in written_ids.chunks(batch_size) {
        sqlx::query("DELETE FROM thingnode_source_association WHERE source_id = ANY($1::uuid[])")
            .bind(chunk)
            .execute(&mut **tx)
            .await?;
    }

    let mut node_id_column: Vec<Uuid> = Vec::new();
    let mut source_id_column: Vec<Uuid> = Vec::new();
    for src in sources {
        let Some(source_id) = source_ids.get(&src.natural_key()) else {
            continue;
        };
        for node_key in src.thing_node_keys() {
            match thing_node_ids.get(&node_key) {
                Some(node_id) => {
                    node_id_column.push(*node_id);
                    source_id_column.push(*source_id);
                }
                None => warn!(
                    source = %src.external_id,
                    node = %node_key,
                    "Thing node not found for source association, skipping link"
                ),
            }
        }
    }

    for (node_chunk, source_chunk) in node_id_column
        .chunks(batch_size)
        .zip(source_id_column.chunks(batch_size))
    {
        sqlx::query(
            "INSERT INTO thingnode_source_association (thing_node_id, source_id) \
             SELECT thing_node_id, source_id \
             FROM UNNEST($1::uuid[], $2::uuid[]) AS t(thing_node_id, source_id) \
             ON CONFLICT (thing_node_id, source_id) DO NOTHING",
        )
        .bind(node_chunk)
        .bind(source_chunk)
        .execute(&mut **tx)
        .await?;
    }

    debug!(count = node_id_column.len(), "Reconciled source associations");
    Ok(())
}

pub(crate) async fn upsert_sinks(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    sinks: &[Sink],
    thing_node_ids: &HashMap<NaturalKey, Uuid>,
    batch_size: usize,
) -> Result<(), StructureRepositoryError> {
    if sinks.is_empty() {
        return Ok(());
    }

    let prepared: Vec<PreparedRow<'_, Sink>> = sinks
        .iter()
        .map(|snk| {
            Ok(PreparedRow {
                entity: snk,
                preset_filters: serde_json::to_value(&snk.preset_filters)?,
                passthrough_filters: snk
                    .passthrough_filters
                    .as_ref()
                    .map(serde_json::to_value)
                    .transpose()?,
                thing_node_external_ids: snk
                    .thing_node_external_ids
                    .as_ref()
                    .map(serde_json::to_value)
                    .transpose()?,
            })
        })
        .collect::<Result<_, serde_json::Error>>()?;

    let mut sink_ids: HashMap<NaturalKey, Uuid> = HashMap::new();
    for chunk in prepared.chunks(batch_size) {
        let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO sink (id, external_id, stakeholder_key, name, type, visible, \
             display_path, adapter_key, sink_id, ref_key, ref_id, meta_data, \
             preset_filters, passthrough_filters, thing_node_external_ids) ",
        );
        query_builder.push_values(chunk, |mut b, row| {
            let snk = row.entity;
            b.push_bind(snk.id)
                .push_bind(&snk.external_id)
                .push_bind(&snk.stakeholder_key)
                .push_bind(&snk.name)
                .push_bind(&snk.sink_type)
                .push_bind(snk.visible)
                .push_bind(&snk.display_path)
                .push_bind(&snk.adapter_key)
                .push_bind(&snk.sink_id)
                .push_bind(&snk.ref_key)
                .push_bind(&snk.ref_id)
                .push_bind(&snk.meta_data)
                .push_bind(&row.preset_filters)
                .push_bind(&row.passthrough_filters)
                .push_bind(&row.thing_node_external_ids);
        });
        query_builder.push(
            " ON CONFLICT (external_id, stakeholder_key) DO UPDATE SET \
             name = EXCLUDED.name, type = EXCLUDED.type, visible = EXCLUDED.visible, \
             display_path = EXCLUDED.display_path, adapter_key = EXCLUDED.adapter_key, \
             sink_id = EXCLUDED.sink_id, ref_key = EXCLUDED.ref_key, \
             ref_id = EXCLUDED.ref_id, meta_data = EXCLUDED.meta_data, \
             preset_filters = EXCLUDED.preset_filters, \
             passthrough_filters = EXCLUDED.passthrough_filters, \
             thing_node_external_ids = EXCLUDED.thing_node_external_ids \
             RETURNING id, external_id, stakeholder_key",
        );
        let rows: Vec<IdRow> = query_builder
            .build_query_as()
            .fetch_all(&mut **tx)
            .await?;
        for row in rows {
            sink_ids.insert(NaturalKey::new(row.stakeholder_key, row.external_id), row.id);
        }
    }
    debug!(count = sinks.len(), "Upserted sinks");

    let written_ids: Vec<Uuid> = sink_ids.values().copied().collect();
    for chunk in written_ids.chunks(batch_size) {
        sqlx::query("DELETE FROM thingnode_sink_association WHERE sink_id = ANY($1::uuid[])")
            .bind(chunk)
            .execute(&mut **tx)
            .await?;
    }

    let mut node_id_column: Vec<Uuid> = Vec::new();
    let mut sink_id_column: Vec<Uuid> = Vec::new();
    for snk in sinks {
        let Some(sink_id) = sink_ids.get(&snk.natural_key()) else {
            continue;
        };
        for node_key in snk.thing_node_keys() {
            match thing_node_ids.get(&node_key) {
                Some(node_id) => {
                    node_id_column.push(*node_id);
                    sink_id_column.push(*sink_id);
                }
                None => warn!(
                    sink = %snk.external_id,
                    node = %node_key,
                    "Thing node not found for sink association, skipping link"
                ),
            }
        }
    }

    for (node_chunk, sink_chunk) in node_id_column
        .chunks(batch_size)
        .zip(sink_id_column.chunks(batch_size))
    {
        sqlx::query(
            "INSERT INTO thingnode_sink_association (thing_node_id, sink_id) \
             SELECT thing_node_id, sink_id \
             FROM UNNEST($1::uuid[], $2::uuid[]) AS t(thing_node_id, sink_id) \
             ON CONFLICT (thing_node_id, sink_id) DO NOTHING",
        )
        .bind(node_chunk)
        .bind(sink_chunk)
        .execute(&mut **tx)
        .await?;
    }

    debug!(count = node_id_column.len(), "Reconciled sink associations");
    Ok(())
}
