//! Level-ordered sorting of thing nodes.
//!
//! The store represents the tree via nullable parent back-references,
//! so child lists have to be reconstructed here: an adjacency map is
//! built once per synchronization and never cached across calls. The
//! flattened output places every node strictly after its parent, which
//! the upsert phase relies on to satisfy the parent foreign key without
//! deferred constraint checking.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, warn};
use uuid::Uuid;

use structure_sync_shared::{NaturalKey, ThingNode};

/// Sorts thing nodes into hierarchical levels and flattens the result,
/// excluding orphan nodes.
///
/// Nodes whose natural key matches an entry of `existing_ids` adopt the
/// stored surrogate id; all others keep their freshly assigned one.
/// A node whose declared parent does not resolve to any node in the
/// document is an orphan: it is logged and excluded entirely, neither
/// written nor treated as a root. Within a level, each node's children
/// are ordered lexicographically by external id.
pub fn sort_thing_nodes(
    thing_nodes: &[ThingNode],
    existing_ids: &HashMap<NaturalKey, Uuid>,
) -> Vec<ThingNode> {
    let mut nodes: Vec<ThingNode> = thing_nodes.to_vec();

    for node in &mut nodes {
        if let Some(id) = existing_ids.get(&node.natural_key()) {
            node.id = *id;
            debug!(node = %node.external_id, id = %id, "Thing node matched existing record");
        }
    }

    let index_by_key: HashMap<NaturalKey, usize> = nodes
        .iter()
        .enumerate()
        .map(|(index, node)| (node.natural_key(), index))
        .collect();

    let mut children_by_index: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut roots: Vec<usize> = Vec::new();

    for (index, node) in nodes.iter().enumerate() {
        match node.parent_key() {
            None => roots.push(index),
            Some(parent_key) => match index_by_key.get(&parent_key) {
                Some(parent_index) => {
                    children_by_index.entry(*parent_index).or_default().push(index);
                }
                None => {
                    warn!(
                        node = %node.external_id,
                        parent = %parent_key,
                        "Orphan node detected, parent not found; excluding from sort"
                    );
                }
            },
        }
    }

    // Resolve parent surrogate ids now that every node carries its
    // final id.
    let parent_ids: Vec<Option<Uuid>> = nodes
        .iter()
        .map(|node| {
            node.parent_key()
                .and_then(|key| index_by_key.get(&key))
                .map(|parent_index| nodes[*parent_index].id)
        })
        .collect();
    for (node, parent_id) in nodes.iter_mut().zip(parent_ids) {
        if parent_id.is_some() {
            node.parent_node_id = parent_id;
        }
    }

    let mut sorted_indices: Vec<usize> = Vec::with_capacity(nodes.len());
    let mut queue: VecDeque<usize> = roots.into_iter().collect();

    while let Some(index) = queue.pop_front() {
        sorted_indices.push(index);
        if let Some(children) = children_by_index.get(&index) {
            let mut children = children.clone();
            children.sort_by(|a, b| nodes[*a].external_id.cmp(&nodes[*b].external_id));
            queue.extend(children);
        }
    }

    let sorted: Vec<ThingNode> = sorted_indices
        .into_iter()
        .map(|index| nodes[index].clone())
        .collect();

    debug!(
        count = sorted.len(),
        total = thing_nodes.len(),
        "Flattened thing nodes into level order"
    );
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(external_id: &str, parent: Option<&str>) -> ThingNode {
        ThingNode {
            id: Uuid::new_v4(),
            external_id: external_id.to_string(),
            stakeholder_key: "SK1".to_string(),
            name: format!("Node {external_id}"),
            description: None,
            parent_external_node_id: parent.map(str::to_string),
            parent_node_id: None,
            element_type_external_id: "Type1".to_string(),
            element_type_id: None,
            meta_data: None,
        }
    }

    fn position(sorted: &[ThingNode], external_id: &str) -> usize {
        sorted
            .iter()
            .position(|n| n.external_id == external_id)
            .unwrap_or_else(|| panic!("node {external_id} missing from sort output"))
    }

    #[test]
    fn parents_appear_strictly_before_children() {
        let nodes = vec![
            node("leaf", Some("mid")),
            node("mid", Some("root")),
            node("root", None),
        ];
        let sorted = sort_thing_nodes(&nodes, &HashMap::new());

        assert_eq!(sorted.len(), 3);
        for n in &sorted {
            if let Some(parent) = &n.parent_external_node_id {
                assert!(position(&sorted, parent) < position(&sorted, &n.external_id));
            }
        }
    }

    #[test]
    fn children_are_sorted_lexicographically_within_a_level() {
        let nodes = vec![
            node("root", None),
            node("b_child", Some("root")),
            node("a_child", Some("root")),
            node("c_child", Some("root")),
        ];
        let sorted = sort_thing_nodes(&nodes, &HashMap::new());

        let ids: Vec<&str> = sorted.iter().map(|n| n.external_id.as_str()).collect();
        assert_eq!(ids, vec!["root", "a_child", "b_child", "c_child"]);
    }

    #[test]
    fn existing_surrogate_ids_are_adopted() {
        let nodes = vec![node("root", None)];
        let stored_id = Uuid::new_v4();
        let existing = HashMap::from([(NaturalKey::new("SK1", "root"), stored_id)]);

        let sorted = sort_thing_nodes(&nodes, &existing);
        assert_eq!(sorted[0].id, stored_id);
    }

    #[test]
    fn parent_surrogate_ids_are_resolved() {
        let nodes = vec![node("root", None), node("child", Some("root"))];
        let sorted = sort_thing_nodes(&nodes, &HashMap::new());

        let root_id = sorted[position(&sorted, "root")].id;
        let child = &sorted[position(&sorted, "child")];
        assert_eq!(child.parent_node_id, Some(root_id));
    }

    #[test]
    fn orphans_are_excluded_entirely() {
        let nodes = vec![
            node("root", None),
            node("child", Some("root")),
            node("orphan", Some("missing")),
        ];
        let sorted = sort_thing_nodes(&nodes, &HashMap::new());

        assert_eq!(sorted.len(), 2);
        assert!(!sorted.iter().any(|n| n.external_id == "orphan"));
    }

    #[test]
    fn orphan_subtrees_are_dropped_with_their_root() {
        let nodes = vec![
            node("root", None),
            node("orphan", Some("missing")),
            node("orphan_child", Some("orphan")),
        ];
        let sorted = sort_thing_nodes(&nodes, &HashMap::new());

        // The orphan's child resolves its parent but is unreachable
        // from the root set, so it is dropped from the flattening too.
        assert_eq!(sorted.len(), 1);
        assert_eq!(sorted[0].external_id, "root");
    }

    #[test]
    fn multiple_roots_keep_document_order() {
        let nodes = vec![node("z_root", None), node("a_root", None)];
        let sorted = sort_thing_nodes(&nodes, &HashMap::new());

        let ids: Vec<&str> = sorted.iter().map(|n| n.external_id.as_str()).collect();
        assert_eq!(ids, vec!["z_root", "a_root"]);
    }
}
