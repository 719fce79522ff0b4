//! Error types raised while parsing or validating a structure document.
//! Both are produced before any store access takes place.
use thiserror::Error;

use crate::types::EntityKind;

/// Represents a structure document that is internally inconsistent.
///
/// Raised by [`crate::CompleteStructure::validate`] before any store
/// mutation; a document failing any of these checks aborts the whole
/// synchronization.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("the structure must include at least one element type to be valid")]
    MissingElementTypes,

    #[error("{kind} '{name}' has an empty {field}")]
    EmptyField {
        kind: EntityKind,
        name: String,
        field: &'static str,
    },

    #[error("the natural key ({stakeholder_key}, {external_id}) occurs more than once among the {kind} entries")]
    DuplicateNaturalKey {
        kind: EntityKind,
        stakeholder_key: String,
        external_id: String,
    },

    #[error("thing node '{node}' references non-existing element type '{element_type}'")]
    UnknownElementType { node: String, element_type: String },

    #[error("root node '{node}' has an invalid parent reference '{parent}' that does not match any thing node")]
    InvalidParentReference { node: String, parent: String },

    #[error("circular parent reference detected at node '{node}'")]
    CircularReference { node: String },

    #[error("inconsistent stakeholder key at node '{node}'")]
    InconsistentStakeholderKey { node: String },

    #[error("{kind} '{name}' references non-existing thing node '{node}'")]
    UnknownThingNodeReference {
        kind: EntityKind,
        name: String,
        node: String,
    },

    #[error("the thing_node_external_ids attribute of {kind} '{name}' contains the duplicate entry '{node}'")]
    DuplicateThingNodeReference {
        kind: EntityKind,
        name: String,
        node: String,
    },

    #[error("the name of a filter must be set")]
    EmptyFilterName,
}

/// Represents a structure document that could not be read at all,
/// e.g. a missing file or malformed JSON.
#[derive(Debug, Error)]
pub enum ParsingError {
    #[error("could not read structure file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse structure document: {0}")]
    Json(#[from] serde_json::Error),
}
