use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::NaturalKey;

/// A category assigned to thing nodes, e.g. "plant" or "sensor group".
///
/// Thing nodes reference their element type by external id in the
/// document; the surrogate id relationship is resolved at write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementType {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub external_id: String,
    pub stakeholder_key: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl ElementType {
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey::new(&self.stakeholder_key, &self.external_id)
    }
}
