//! Domain types for the structure catalog.
//!
//! Every persisted entity carries a store-assigned surrogate id plus a
//! [`NaturalKey`] (stakeholder key and external id) that callers use to
//! re-submit documents without knowing surrogate ids.
mod element_type;
mod filter;
mod natural_key;
mod sink;
mod source;
mod structure;
mod thing_node;

pub use element_type::ElementType;
pub use filter::Filter;
pub use natural_key::{EntityKind, NaturalKey};
pub use sink::Sink;
pub use source::Source;
pub use structure::{CompleteStructure, StructureLevel};
pub use thing_node::ThingNode;
