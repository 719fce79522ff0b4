//! Response models for the tree UI.
//!
//! The web layer speaks camelCase to the frontend while the documents
//! and the store stay snake_case, so the shared types are mapped into
//! thin response structs here.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use structure_sync_shared::{Filter, Sink, Source, StructureLevel, ThingNode};

/// Envelope for one level of the navigable tree.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureResponse {
    pub id: String,
    pub name: String,
    pub thing_nodes: Vec<ThingNodeResponse>,
    pub sources: Vec<SourceResponse>,
    pub sinks: Vec<SinkResponse>,
}

impl StructureResponse {
    pub fn new(level: StructureLevel) -> Self {
        StructureResponse {
            id: "structure-catalog".to_string(),
            name: "Structure Catalog".to_string(),
            thing_nodes: level.thing_nodes.into_iter().map(Into::into).collect(),
            sources: level.sources.into_iter().map(Into::into).collect(),
            sinks: level.sinks.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThingNodeResponse {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub meta_data: Option<Value>,
}

impl From<ThingNode> for ThingNodeResponse {
    fn from(node: ThingNode) -> Self {
        ThingNodeResponse {
            id: node.id,
            parent_id: node.parent_node_id,
            name: node.name,
            description: node.description,
            meta_data: node.meta_data,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub source_type: String,
    pub visible: bool,
    pub path: String,
    pub adapter_key: String,
    pub source_id: String,
    pub ref_key: Option<String>,
    pub ref_id: String,
    pub meta_data: Option<Value>,
    pub preset_filters: HashMap<String, Filter>,
    pub passthrough_filters: Option<Vec<Filter>>,
}

impl From<Source> for SourceResponse {
    fn from(source: Source) -> Self {
        SourceResponse {
            id: source.id,
            name: source.name,
            source_type: source.source_type,
            visible: source.visible,
            path: source.display_path,
            adapter_key: source.adapter_key,
            source_id: source.source_id,
            ref_key: source.ref_key,
            ref_id: source.ref_id,
            meta_data: source.meta_data,
            preset_filters: source.preset_filters,
            passthrough_filters: source.passthrough_filters,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SinkResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub sink_type: String,
    pub visible: bool,
    pub path: String,
    pub adapter_key: String,
    pub sink_id: String,
    pub ref_key: Option<String>,
    pub ref_id: String,
    pub meta_data: Option<Value>,
    pub preset_filters: HashMap<String, Filter>,
    pub passthrough_filters: Option<Vec<Filter>>,
}

impl From<Sink> for SinkResponse {
    fn from(sink: Sink) -> Self {
        SinkResponse {
            id: sink.id,
            name: sink.name,
            sink_type: sink.sink_type,
            visible: sink.visible,
            path: sink.display_path,
            adapter_key: sink.adapter_key,
            sink_id: sink.sink_id,
            ref_key: sink.ref_key,
            ref_id: sink.ref_id,
            meta_data: sink.meta_data,
            preset_filters: sink.preset_filters,
            passthrough_filters: sink.passthrough_filters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thing_node_response_uses_camel_case() {
        let node: ThingNode = serde_json::from_value(serde_json::json!({
            "external_id": "Node1",
            "stakeholder_key": "SK1",
            "name": "Node 1",
            "element_type_external_id": "Type1"
        }))
        .unwrap();
        let id = node.id;

        let response: ThingNodeResponse = node.into();
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["id"], serde_json::json!(id));
        assert!(value.get("parentId").is_some());
        assert!(value.get("parent_id").is_none());
    }
}
