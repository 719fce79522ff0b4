//! Shared domain types for the structure synchronization service.
//!
//! This crate holds the structure document model (element types, thing
//! nodes, sources and sinks identified by natural keys), the pure
//! in-memory validation that runs before any store access, and the
//! errors raised while parsing or validating a document.

pub mod errors;
pub mod types;
pub mod validation;

pub use errors::{ParsingError, ValidationError};
pub use types::{
    CompleteStructure, ElementType, EntityKind, Filter, NaturalKey, Sink, Source, StructureLevel,
    ThingNode,
};
