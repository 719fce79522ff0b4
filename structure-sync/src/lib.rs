//! Structure synchronization service.
//!
//! Maintains a hierarchical catalog of element types, thing nodes,
//! sources and sinks in a relational store and exposes it to a
//! low-code pipeline designer as a lazily expandable tree. The catalog
//! is kept consistent under repeated bulk replacement from complete
//! structure documents, either via the HTTP update endpoint or via
//! env-driven prepopulation at startup.

pub mod config;
pub mod dependencies;
pub mod errors;
pub mod models;
pub mod prepopulation;
pub mod server;

pub use config::Config;
pub use dependencies::Dependencies;
pub use errors::ServiceError;
