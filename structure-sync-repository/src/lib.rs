//! Store-facing engine of the structure synchronization service.
//!
//! Provides the [`StructureRepository`] trait together with its
//! PostgreSQL implementation: batched natural-key resolution, the
//! hierarchy sorter, idempotent bulk upserts with association
//! reconciliation, transactional orchestration and the read-side query
//! API consumed by the web layer.

pub mod errors;
pub mod interfaces;
pub mod postgres;
pub mod sorter;

pub use errors::StructureRepositoryError;
pub use interfaces::StructureRepository;
pub use postgres::PostgresStructureRepository;

/// Embedded SQL migrations defining the persisted schema.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
