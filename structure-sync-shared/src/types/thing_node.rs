use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::types::NaturalKey;

/// A node of the navigable hierarchy.
///
/// Nodes form an out-forest: each node has at most one parent,
/// referenced by the parent's external id within the same stakeholder
/// key. A node without a parent reference is a root. The surrogate ids
/// of the parent and the element type (`parent_node_id`,
/// `element_type_id`) are resolved by the synchronization engine and
/// are usually absent in incoming documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThingNode {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub external_id: String,
    pub stakeholder_key: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_external_node_id: Option<String>,
    #[serde(default)]
    pub parent_node_id: Option<Uuid>,
    pub element_type_external_id: String,
    #[serde(default)]
    pub element_type_id: Option<Uuid>,
    #[serde(default)]
    pub meta_data: Option<Value>,
}

impl ThingNode {
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey::new(&self.stakeholder_key, &self.external_id)
    }

    /// Natural key of the declared parent, if any.
    pub fn parent_key(&self) -> Option<NaturalKey> {
        self.parent_external_node_id
            .as_ref()
            .map(|parent| NaturalKey::new(&self.stakeholder_key, parent))
    }

    /// Natural key of the referenced element type.
    pub fn element_type_key(&self) -> NaturalKey {
        NaturalKey::new(&self.stakeholder_key, &self.element_type_external_id)
    }
}
