use std::fmt;

use serde::{Deserialize, Serialize};

/// Caller-facing identity of a catalog entity.
///
/// Natural keys are unique per entity kind and consist of the tenant
/// discriminator (`stakeholder_key`) and the caller-supplied stable
/// `external_id`. All lookups and write operations are keyed by this
/// pair; surrogate ids never cross the API boundary for writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NaturalKey {
    pub stakeholder_key: String,
    pub external_id: String,
}

impl NaturalKey {
    pub fn new(stakeholder_key: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self {
            stakeholder_key: stakeholder_key.into(),
            external_id: external_id.into(),
        }
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.stakeholder_key, self.external_id)
    }
}

/// The four persisted entity kinds of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    ElementType,
    ThingNode,
    Source,
    Sink,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::ElementType => "element type",
            EntityKind::ThingNode => "thing node",
            EntityKind::Source => "source",
            EntityKind::Sink => "sink",
        };
        write!(f, "{name}")
    }
}
