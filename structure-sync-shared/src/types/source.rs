use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::types::{Filter, NaturalKey};

/// A data source that can be wired into pipeline steps.
///
/// Sources attach to any number of thing nodes via
/// `thing_node_external_ids`; the many-to-many association is
/// recomputed from that list on every synchronization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub external_id: String,
    pub stakeholder_key: String,
    pub name: String,
    #[serde(rename = "type")]
    pub source_type: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub display_path: String,
    pub adapter_key: String,
    pub source_id: String,
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

pub(crate) fn default_visible() -> bool {
    true
}

impl Source {
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey::new(&self.stakeholder_key, &self.external_id)
    }

    /// Natural keys of the thing nodes this source is attached to.
    pub fn thing_node_keys(&self) -> Vec<NaturalKey> {
        self.thing_node_external_ids
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|external_id| NaturalKey::new(&self.stakeholder_key, external_id))
            .collect()
    }
}
