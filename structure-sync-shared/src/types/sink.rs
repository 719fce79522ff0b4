use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::types::source::default_visible;
use crate::types::{Filter, NaturalKey};

/// A data sink that can be wired into pipeline steps.
///
/// Mirror of [`crate::Source`] with a sink-side adapter routing id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sink {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub external_id: String,
    pub stakeholder_key: String,
    pub name: String,
    #[serde(rename = "type")]
    pub sink_type: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub display_path: String,
    pub adapter_key: String,
    pub sink_id: String,
    #[serde(default)]
    pub ref_key: Option<String>,
    #[serde(default)]
    pub ref_id: String,
    #[serde(default)]
    pub meta_data: Option<Value>,
    #[serde(default)]
    pub preset_filters: HashMap<String, Filter>,
    #[serde(default)]
    pub passthrough_filters: Option<Vec<Filter>>,
    #[serde(default)]
    pub thing_node_external_ids: Option<Vec<String>>,
}

impl Sink {
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey::new(&self.stakeholder_key, &self.external_id)
    }

    /// Natural keys of the thing nodes this sink is attached to.
    pub fn thing_node_keys(&self) -> Vec<NaturalKey> {
        self.thing_node_external_ids
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|external_id| NaturalKey::new(&self.stakeholder_key, external_id))
            .collect()
    }
}
