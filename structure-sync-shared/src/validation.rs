//! Pure in-memory validation of a structure document.
//!
//! All checks run against the document alone, before any store access;
//! the first failing check aborts the whole synchronization. Entities
//! that already exist in the store are reconciled later by the engine,
//! so every reference checked here must resolve within the document.

use std::collections::{HashMap, HashSet};

use crate::errors::ValidationError;
use crate::types::{CompleteStructure, EntityKind, Filter, NaturalKey};

impl CompleteStructure {
    /// Validates the document for internal consistency.
    ///
    /// Checks, in order: presence of at least one element type, empty
    /// identifying fields, duplicate natural keys per entity kind,
    /// element-type references, parent references (including
    /// stakeholder-key consistency along parent chains), cycles in the
    /// parent relation, and source/sink thing-node references.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.element_types.is_empty() {
            return Err(ValidationError::MissingElementTypes);
        }

        self.check_identifying_fields()?;
        self.check_duplicate_natural_keys()?;
        self.check_element_type_references()?;
        self.check_parent_references()?;
        self.check_cycles()?;
        self.check_source_sink_references()?;

        Ok(())
    }

    fn check_identifying_fields(&self) -> Result<(), ValidationError> {
        for et in &self.element_types {
            check_fields(
                EntityKind::ElementType,
                &et.external_id,
                &et.stakeholder_key,
                &et.name,
            )?;
        }
        for tn in &self.thing_nodes {
            check_fields(
                EntityKind::ThingNode,
                &tn.external_id,
                &tn.stakeholder_key,
                &tn.name,
            )?;
        }
        for src in &self.sources {
            check_fields(
                EntityKind::Source,
                &src.external_id,
                &src.stakeholder_key,
                &src.name,
            )?;
            check_filters(src.preset_filters.values(), src.passthrough_filters.as_deref())?;
        }
        for snk in &self.sinks {
            check_fields(
                EntityKind::Sink,
                &snk.external_id,
                &snk.stakeholder_key,
                &snk.name,
            )?;
            check_filters(snk.preset_filters.values(), snk.passthrough_filters.as_deref())?;
        }
        Ok(())
    }

    fn check_duplicate_natural_keys(&self) -> Result<(), ValidationError> {
        check_unique(
            EntityKind::ElementType,
            self.element_types.iter().map(|et| et.natural_key()),
        )?;
        check_unique(
            EntityKind::ThingNode,
            self.thing_nodes.iter().map(|tn| tn.natural_key()),
        )?;
        check_unique(
            EntityKind::Source,
            self.sources.iter().map(|src| src.natural_key()),
        )?;
        check_unique(
            EntityKind::Sink,
            self.sinks.iter().map(|snk| snk.natural_key()),
        )?;
        Ok(())
    }

    fn check_element_type_references(&self) -> Result<(), ValidationError> {
        let element_type_keys: HashSet<NaturalKey> = self
            .element_types
            .iter()
            .map(|et| et.natural_key())
            .collect();

        for tn in &self.thing_nodes {
            if !element_type_keys.contains(&tn.element_type_key()) {
                return Err(ValidationError::UnknownElementType {
                    node: tn.external_id.clone(),
                    element_type: tn.element_type_external_id.clone(),
                });
            }
        }
        Ok(())
    }

    /// A parent reference must resolve to a node with the same
    /// stakeholder key. A reference matching a node of a different
    /// stakeholder key breaks owner-key consistency along the chain; a
    /// reference matching nothing at all makes the node a declared root
    /// with an invalid reference, which is only valid when null.
    fn check_parent_references(&self) -> Result<(), ValidationError> {
        let node_keys: HashSet<NaturalKey> =
            self.thing_nodes.iter().map(|tn| tn.natural_key()).collect();
        let external_ids: HashSet<&str> = self
            .thing_nodes
            .iter()
            .map(|tn| tn.external_id.as_str())
            .collect();

        for tn in &self.thing_nodes {
            let Some(parent_key) = tn.parent_key() else {
                continue;
            };
            if node_keys.contains(&parent_key) {
                continue;
            }
            if external_ids.contains(parent_key.external_id.as_str()) {
                return Err(ValidationError::InconsistentStakeholderKey {
                    node: tn.external_id.clone(),
                });
            }
            return Err(ValidationError::InvalidParentReference {
                node: tn.name.clone(),
                parent: parent_key.external_id,
            });
        }
        Ok(())
    }

    fn check_cycles(&self) -> Result<(), ValidationError> {
        let nodes_by_key: HashMap<NaturalKey, &crate::types::ThingNode> = self
            .thing_nodes
            .iter()
            .map(|tn| (tn.natural_key(), tn))
            .collect();

        for tn in &self.thing_nodes {
            let mut visited: HashSet<NaturalKey> = HashSet::new();
            visited.insert(tn.natural_key());

            let mut current = tn;
            while let Some(parent_key) = current.parent_key() {
                let Some(parent) = nodes_by_key.get(&parent_key) else {
                    break;
                };
                if !visited.insert(parent_key) {
                    return Err(ValidationError::CircularReference {
                        node: parent.external_id.clone(),
                    });
                }
                current = parent;
            }
        }
        Ok(())
    }

    fn check_source_sink_references(&self) -> Result<(), ValidationError> {
        let node_keys: HashSet<NaturalKey> =
            self.thing_nodes.iter().map(|tn| tn.natural_key()).collect();

        for src in &self.sources {
            check_thing_node_references(
                EntityKind::Source,
                &src.name,
                src.thing_node_external_ids.as_deref(),
                &src.stakeholder_key,
                &node_keys,
            )?;
        }
        for snk in &self.sinks {
            check_thing_node_references(
                EntityKind::Sink,
                &snk.name,
                snk.thing_node_external_ids.as_deref(),
                &snk.stakeholder_key,
                &node_keys,
            )?;
        }
        Ok(())
    }
}

fn check_fields(
    kind: EntityKind,
    external_id: &str,
    stakeholder_key: &str,
    name: &str,
) -> Result<(), ValidationError> {
    let identifier = if external_id.trim().is_empty() {
        name
    } else {
        external_id
    };
    for (field, value) in [
        ("external_id", external_id),
        ("stakeholder_key", stakeholder_key),
        ("name", name),
    ] {
        if value.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                kind,
                name: identifier.to_string(),
                field,
            });
        }
    }
    Ok(())
}

fn check_filters<'a>(
    preset: impl Iterator<Item = &'a Filter>,
    passthrough: Option<&'a [Filter]>,
) -> Result<(), ValidationError> {
    for filter in preset.chain(passthrough.unwrap_or_default()) {
        if filter.name.trim().is_empty() {
            return Err(ValidationError::EmptyFilterName);
        }
    }
    Ok(())
}

fn check_unique(
    kind: EntityKind,
    keys: impl Iterator<Item = NaturalKey>,
) -> Result<(), ValidationError> {
    let mut seen: HashSet<NaturalKey> = HashSet::new();
    for key in keys {
        if !seen.insert(key.clone()) {
            return Err(ValidationError::DuplicateNaturalKey {
                kind,
                stakeholder_key: key.stakeholder_key,
                external_id: key.external_id,
            });
        }
    }
    Ok(())
}

fn check_thing_node_references(
    kind: EntityKind,
    name: &str,
    external_ids: Option<&[String]>,
    stakeholder_key: &str,
    node_keys: &HashSet<NaturalKey>,
) -> Result<(), ValidationError> {
    let Some(external_ids) = external_ids else {
        return Ok(());
    };
    let mut seen: HashSet<&str> = HashSet::new();
    for external_id in external_ids {
        if !seen.insert(external_id.as_str()) {
            return Err(ValidationError::DuplicateThingNodeReference {
                kind,
                name: name.to_string(),
                node: external_id.clone(),
            });
        }
        if !node_keys.contains(&NaturalKey::new(stakeholder_key, external_id)) {
            return Err(ValidationError::UnknownThingNodeReference {
                kind,
                name: name.to_string(),
                node: external_id.clone(),
            });
        }
    }
    Ok(())
}
