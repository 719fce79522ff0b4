use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ParsingError;
use crate::types::{ElementType, Sink, Source, ThingNode};

/// A complete structure document, the unit of input to a
/// synchronization.
///
/// Surrogate ids are assigned on deserialization for entities that turn
/// out to be new; the engine replaces them with the stored ids for
/// entities whose natural key already exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteStructure {
    #[serde(default)]
    pub element_types: Vec<ElementType>,
    #[serde(default)]
    pub thing_nodes: Vec<ThingNode>,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub sinks: Vec<Sink>,
}

impl CompleteStructure {
    /// Loads and parses a structure document from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ParsingError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Parses a structure document from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ParsingError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// One level of the navigable tree: the child nodes of a parent plus
/// the sources and sinks attached to the parent itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructureLevel {
    pub thing_nodes: Vec<ThingNode>,
    pub sources: Vec<Source>,
    pub sinks: Vec<Sink>,
}
