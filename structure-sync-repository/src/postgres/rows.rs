//! Row types mapping the persisted schema to the shared domain models.
use serde_json::Value;
use uuid::Uuid;

use structure_sync_shared::{Sink, Source, ThingNode};

/// Key columns returned by upsert statements; used to map natural keys
/// back to the surrogate ids the store settled on.
#[derive(sqlx::FromRow)]
pub(crate) struct IdRow {
    pub id: Uuid,
    pub external_id: String,
    pub stakeholder_key: String,
}

#[derive(sqlx::FromRow)]
pub(crate) struct ThingNodeRow {
    pub id: Uuid,
    pub external_id: String,
    pub stakeholder_key: String,
    pub name: String,
    pub description: Option<String>,
    pub parent_node_id: Option<Uuid>,
    pub parent_external_node_id: Option<String>,
    pub element_type_id: Uuid,
    pub element_type_external_id: String,
    pub meta_data: Option<Value>,
}

impl From<ThingNodeRow> for ThingNode {
    fn from(row: ThingNodeRow) -> Self {
        ThingNode {
            id: row.id,
            external_id: row.external_id,
            stakeholder_key: row.stakeholder_key,
            name: row.name,
            description: row.description,
            parent_external_node_id: row.parent_external_node_id,
            parent_node_id: row.parent_node_id,
            element_type_external_id: row.element_type_external_id,
            element_type_id: Some(row.element_type_id),
            meta_data: row.meta_data,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct SourceRow {
    pub id: Uuid,
    pub external_id: String,
    pub stakeholder_key: String,
    pub name: String,
    #[sqlx(rename = "type")]
    pub source_type: String,
    pub visible: bool,
    pub display_path: String,
    pub adapter_key: String,
    pub source_id: String,
    pub ref_key: Option<String>,
    pub ref_id: String,
    pub meta_data: Option<Value>,
    pub preset_filters: Value,
    pub passthrough_filters: Option<Value>,
    pub thing_node_external_ids: Option<Value>,
}

impl TryFrom<SourceRow> for Source {
    type Error = serde_json::Error;

    fn try_from(row: SourceRow) -> Result<Self, Self::Error> {
        Ok(Source {
            id: row.id,
            external_id: row.external_id,
            stakeholder_key: row.stakeholder_key,
            name: row.name,
            source_type: row.source_type,
            visible: row.visible,
            display_path: row.display_path,
            adapter_key: row.adapter_key,
            source_id: row.source_id,
            ref_key: row.ref_key,
            ref_id: row.ref_id,
            meta_data: row.meta_data,
            preset_filters: serde_json::from_value(row.preset_filters)?,
            passthrough_filters: row
                .passthrough_filters
                .map(serde_json::from_value)
                .transpose()?,
            thing_node_external_ids: row
                .thing_node_external_ids
                .map(serde_json::from_value)
                .transpose()?,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct SinkRow {
    pub id: Uuid,
    pub external_id: String,
    pub stakeholder_key: String,
    pub name: String,
    #[sqlx(rename = "type")]
    pub sink_type: String,
    pub visible: bool,
    pub display_path: String,
    pub adapter_key: String,
    pub sink_id: String,
    pub ref_key: Option<String>,
    pub ref_id: String,
    pub meta_data: Option<Value>,
    pub preset_filters: Value,
    pub passthrough_filters: Option<Value>,
    pub thing_node_external_ids: Option<Value>,
}

impl TryFrom<SinkRow> for Sink {
    type Error = serde_json::Error;

    fn try_from(row: SinkRow) -> Result<Self, Self::Error> {
        Ok(Sink {
            id: row.id,
            external_id: row.external_id,
            stakeholder_key: row.stakeholder_key,
            name: row.name,
            sink_type: row.sink_type,
            visible: row.visible,
            display_path: row.display_path,
            adapter_key: row.adapter_key,
            sink_id: row.sink_id,
            ref_key: row.ref_key,
            ref_id: row.ref_id,
            meta_data: row.meta_data,
            preset_filters: serde_json::from_value(row.preset_filters)?,
            passthrough_filters: row
                .passthrough_filters
                .map(serde_json::from_value)
                .transpose()?,
            thing_node_external_ids: row
                .thing_node_external_ids
                .map(serde_json::from_value)
                .transpose()?,
        })
    }
}
