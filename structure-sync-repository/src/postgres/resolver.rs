//! Batched natural-key resolution.
//!
//! Stores impose a ceiling on bind parameters per query, so key sets
//! are partitioned into batches and resolved one query at a time.
//! Missing keys are simply absent from the result, since "does not
//! exist yet" is the normal case for new entities.

use std::collections::HashMap;

use sqlx::Row;
use tracing::debug;
use uuid::Uuid;

use structure_sync_shared::NaturalKey;

use crate::errors::StructureRepositoryError;

/// The four entity tables natural keys resolve against.
#[derive(Debug, Clone, Copy)]
pub(crate) enum EntityTable {
    ElementType,
    ThingNode,
    Source,
    Sink,
}

impl EntityTable {
    pub(crate) fn name(self) -> &'static str {
        match self {
            EntityTable::ElementType => "element_type",
            EntityTable::ThingNode => "thing_node",
            EntityTable::Source => "source",
            EntityTable::Sink => "sink",
        }
    }
}

/// Resolves the given natural keys to the surrogate ids of existing
/// records, issuing one query per batch of at most `batch_size` keys.
///
/// An empty key set short-circuits without touching the store.
pub(crate) async fn fetch_existing_ids(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    table: EntityTable,
    keys: &[NaturalKey],
    batch_size: usize,
) -> Result<HashMap<NaturalKey, Uuid>, StructureRepositoryError> {
    let mut mapping: HashMap<NaturalKey, Uuid> = HashMap::new();
    if keys.is_empty() {
        return Ok(mapping);
    }

    let query = format!(
        "SELECT id, external_id, stakeholder_key FROM {} \
         WHERE (stakeholder_key, external_id) IN (SELECT * FROM UNNEST($1::text[], $2::text[]))",
        table.name()
    );

    for key_batch in keys.chunks(batch_size) {
        let stakeholder_keys: Vec<&str> = key_batch
            .iter()
            .map(|key| key.stakeholder_key.as_str())
            .collect();
        let external_ids: Vec<&str> = key_batch
            .iter()
            .map(|key| key.external_id.as_str())
            .collect();

        let rows = sqlx::query(&query)
            .bind(&stakeholder_keys)
            .bind(&external_ids)
            .fetch_all(&mut **tx)
            .await?;

        for row in rows {
            let key = NaturalKey::new(
                row.try_get::<String, _>("stakeholder_key")?,
                row.try_get::<String, _>("external_id")?,
            );
            mapping.insert(key, row.try_get("id")?);
        }
    }

    debug!(
        table = table.name(),
        requested = keys.len(),
        found = mapping.len(),
        "Resolved existing records by natural key"
    );
    Ok(mapping)
}
