//! Integration tests for the PostgreSQL structure repository.
//!
//! These tests require a real PostgreSQL database and use SQLx test
//! macros for isolation; the schema is applied from `migrations/`.
//!
//! Run with: `cargo test --test postgres_integration`

use sqlx::Row;
use uuid::Uuid;

use structure_sync_repository::{
    PostgresStructureRepository, StructureRepository, StructureRepositoryError,
};
use structure_sync_shared::CompleteStructure;

/// One element type, a root -> mid -> leaf chain, a source attached to
/// the leaf and a sink attached to mid.
fn chain_structure() -> CompleteStructure {
    CompleteStructure::from_json_str(
        r#"{
            "element_types": [
                {"external_id": "Type1", "stakeholder_key": "SK1", "name": "Type 1",
                 "description": "First type"}
            ],
            "thing_nodes": [
                {"external_id": "root", "stakeholder_key": "SK1", "name": "Root",
                 "element_type_external_id": "Type1",
                 "meta_data": {"location": "north"}},
                {"external_id": "mid", "stakeholder_key": "SK1", "name": "Mid",
                 "parent_external_node_id": "root",
                 "element_type_external_id": "Type1"},
                {"external_id": "leaf", "stakeholder_key": "SK1", "name": "Leaf",
                 "parent_external_node_id": "mid",
                 "element_type_external_id": "Type1"}
            ],
            "sources": [
                {"external_id": "Source1", "stakeholder_key": "SK1", "name": "Leaf Source",
                 "type": "multitsframe", "adapter_key": "sql-adapter",
                 "source_id": "measurements",
                 "display_path": "Root / Mid / Leaf",
                 "preset_filters": {
                     "upper": {"name": "Upper Threshold", "type": "free_text", "required": false}
                 },
                 "passthrough_filters": [
                     {"name": "Timestamp Range", "type": "free_text", "required": true}
                 ],
                 "thing_node_external_ids": ["leaf"]}
            ],
            "sinks": [
                {"external_id": "Sink1", "stakeholder_key": "SK1", "name": "Mid Sink",
                 "type": "multitsframe", "adapter_key": "sql-adapter",
                 "sink_id": "predictions",
                 "thing_node_external_ids": ["mid"]}
            ]
        }"#,
    )
    .unwrap()
}

async fn count(pool: &sqlx::PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn node_id(pool: &sqlx::PgPool, external_id: &str) -> Uuid {
    sqlx::query_scalar("SELECT id FROM thing_node WHERE external_id = $1")
        .bind(external_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn synchronize_creates_all_entities(pool: sqlx::PgPool) {
    let repository = PostgresStructureRepository::new(pool.clone());

    repository.synchronize(&chain_structure()).await.unwrap();

    assert_eq!(count(&pool, "element_type").await, 1);
    assert_eq!(count(&pool, "thing_node").await, 3);
    assert_eq!(count(&pool, "source").await, 1);
    assert_eq!(count(&pool, "sink").await, 1);
    assert_eq!(count(&pool, "thingnode_source_association").await, 1);
    assert_eq!(count(&pool, "thingnode_sink_association").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn synchronize_is_idempotent(pool: sqlx::PgPool) {
    let repository = PostgresStructureRepository::new(pool.clone());

    repository.synchronize(&chain_structure()).await.unwrap();
    let first_root_id = node_id(&pool, "root").await;

    repository.synchronize(&chain_structure()).await.unwrap();

    assert_eq!(count(&pool, "element_type").await, 1);
    assert_eq!(count(&pool, "thing_node").await, 3);
    assert_eq!(count(&pool, "source").await, 1);
    assert_eq!(count(&pool, "sink").await, 1);
    assert_eq!(count(&pool, "thingnode_source_association").await, 1);
    assert_eq!(count(&pool, "thingnode_sink_association").await, 1);
    // Surrogate ids never change across synchronizations.
    assert_eq!(node_id(&pool, "root").await, first_root_id);
}

#[sqlx::test(migrations = "./migrations")]
async fn round_trip_preserves_field_values(pool: sqlx::PgPool) {
    let repository = PostgresStructureRepository::new(pool.clone());
    let structure = chain_structure();

    repository.synchronize(&structure).await.unwrap();

    let root = repository
        .get_thing_node(node_id(&pool, "root").await)
        .await
        .unwrap();
    assert_eq!(root.name, "Root");
    assert_eq!(root.meta_data, structure.thing_nodes[0].meta_data);
    assert!(root.parent_node_id.is_none());
    assert!(root.element_type_id.is_some());

    let source_id: Uuid = sqlx::query_scalar("SELECT id FROM source WHERE external_id = 'Source1'")
        .fetch_one(&pool)
        .await
        .unwrap();
    let source = repository.get_source(source_id).await.unwrap();
    let expected = &structure.sources[0];
    assert_eq!(source.name, expected.name);
    assert_eq!(source.source_type, expected.source_type);
    assert_eq!(source.display_path, expected.display_path);
    assert_eq!(source.preset_filters, expected.preset_filters);
    assert_eq!(source.passthrough_filters, expected.passthrough_filters);
    assert_eq!(source.thing_node_external_ids, expected.thing_node_external_ids);
}

#[sqlx::test(migrations = "./migrations")]
async fn get_children_walks_the_tree_one_level_at_a_time(pool: sqlx::PgPool) {
    let repository = PostgresStructureRepository::new(pool.clone());

    repository.synchronize(&chain_structure()).await.unwrap();

    let roots = repository.get_children(None).await.unwrap();
    assert_eq!(roots.thing_nodes.len(), 1);
    assert_eq!(roots.thing_nodes[0].external_id, "root");
    assert!(roots.sources.is_empty());
    assert!(roots.sinks.is_empty());

    let below_root = repository
        .get_children(Some(roots.thing_nodes[0].id))
        .await
        .unwrap();
    assert_eq!(below_root.thing_nodes.len(), 1);
    assert_eq!(below_root.thing_nodes[0].external_id, "mid");
    assert!(below_root.sources.is_empty());
    assert!(below_root.sinks.is_empty());

    // Mid has one child and carries the sink itself.
    let below_mid = repository
        .get_children(Some(below_root.thing_nodes[0].id))
        .await
        .unwrap();
    assert_eq!(below_mid.thing_nodes.len(), 1);
    assert_eq!(below_mid.thing_nodes[0].external_id, "leaf");
    assert!(below_mid.sources.is_empty());
    assert_eq!(below_mid.sinks.len(), 1);
    assert_eq!(below_mid.sinks[0].external_id, "Sink1");

    let below_leaf = repository
        .get_children(Some(below_mid.thing_nodes[0].id))
        .await
        .unwrap();
    assert!(below_leaf.thing_nodes.is_empty());
    assert_eq!(below_leaf.sources.len(), 1);
    assert_eq!(below_leaf.sources[0].external_id, "Source1");
    assert!(below_leaf.sinks.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn get_children_fails_for_unknown_parent(pool: sqlx::PgPool) {
    let repository = PostgresStructureRepository::new(pool.clone());

    repository.synchronize(&chain_structure()).await.unwrap();

    let result = repository.get_children(Some(Uuid::new_v4())).await;
    assert!(matches!(result, Err(StructureRepositoryError::NotFound(_))));
}

#[sqlx::test(migrations = "./migrations")]
async fn partial_document_deletes_nothing(pool: sqlx::PgPool) {
    let repository = PostgresStructureRepository::new(pool.clone());

    repository.synchronize(&chain_structure()).await.unwrap();

    // Re-synchronize with leaf and its source removed from the
    // document; both must remain in the store.
    let partial = CompleteStructure::from_json_str(
        r#"{
            "element_types": [
                {"external_id": "Type1", "stakeholder_key": "SK1", "name": "Type 1"}
            ],
            "thing_nodes": [
                {"external_id": "root", "stakeholder_key": "SK1", "name": "Root",
                 "element_type_external_id": "Type1"},
                {"external_id": "mid", "stakeholder_key": "SK1", "name": "Mid",
                 "parent_external_node_id": "root",
                 "element_type_external_id": "Type1"}
            ]
        }"#,
    )
    .unwrap();
    repository.synchronize(&partial).await.unwrap();

    assert_eq!(count(&pool, "thing_node").await, 3);
    assert_eq!(count(&pool, "source").await, 1);
    assert_eq!(count(&pool, "thingnode_source_association").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn update_changes_fields_in_place(pool: sqlx::PgPool) {
    let repository = PostgresStructureRepository::new(pool.clone());

    repository.synchronize(&chain_structure()).await.unwrap();
    let original_id = node_id(&pool, "root").await;

    let mut updated = chain_structure();
    updated.thing_nodes[0].name = "Renamed Root".to_string();
    updated.thing_nodes[0].description = Some("now described".to_string());
    repository.synchronize(&updated).await.unwrap();

    let root = repository.get_thing_node(original_id).await.unwrap();
    assert_eq!(root.name, "Renamed Root");
    assert_eq!(root.description.as_deref(), Some("now described"));
}

#[sqlx::test(migrations = "./migrations")]
async fn association_sets_are_fully_recomputed(pool: sqlx::PgPool) {
    let repository = PostgresStructureRepository::new(pool.clone());

    repository.synchronize(&chain_structure()).await.unwrap();

    // Move the source from leaf to root; the stale link must go away.
    let mut moved = chain_structure();
    moved.sources[0].thing_node_external_ids = Some(vec!["root".to_string()]);
    repository.synchronize(&moved).await.unwrap();

    let rows = sqlx::query("SELECT thing_node_id FROM thingnode_source_association")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    let linked: Uuid = rows[0].get("thing_node_id");
    assert_eq!(linked, node_id(&pool, "root").await);
}

#[sqlx::test(migrations = "./migrations")]
async fn wipe_empties_the_store(pool: sqlx::PgPool) {
    let repository = PostgresStructureRepository::new(pool.clone());

    repository.synchronize(&chain_structure()).await.unwrap();
    assert!(!repository.is_empty().await.unwrap());

    repository.wipe().await.unwrap();

    assert!(repository.is_empty().await.unwrap());
    assert_eq!(count(&pool, "element_type").await, 0);
    assert_eq!(count(&pool, "thingnode_source_association").await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn invalid_document_leaves_store_untouched(pool: sqlx::PgPool) {
    let repository = PostgresStructureRepository::new(pool.clone());

    let invalid = CompleteStructure::from_json_str(r#"{"element_types": []}"#).unwrap();
    let result = repository.synchronize(&invalid).await;

    assert!(matches!(
        result,
        Err(StructureRepositoryError::Validation(_))
    ));
    assert!(repository.is_empty().await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn get_by_ids_returns_only_existing_records(pool: sqlx::PgPool) {
    let repository = PostgresStructureRepository::new(pool.clone());

    repository.synchronize(&chain_structure()).await.unwrap();

    let root_id = node_id(&pool, "root").await;
    let missing = Uuid::new_v4();

    let found = repository
        .get_thing_nodes_by_ids(&[root_id, missing])
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[&root_id].external_id, "root");

    // An empty input is not an error, it short-circuits.
    let empty = repository.get_thing_nodes_by_ids(&[]).await.unwrap();
    assert!(empty.is_empty());

    // A non-empty input with zero hits is.
    let result = repository.get_thing_nodes_by_ids(&[missing]).await;
    assert!(matches!(result, Err(StructureRepositoryError::NotFound(_))));
}

#[sqlx::test(migrations = "./migrations")]
async fn search_by_name_is_case_insensitive(pool: sqlx::PgPool) {
    let repository = PostgresStructureRepository::new(pool.clone());

    repository.synchronize(&chain_structure()).await.unwrap();

    let nodes = repository.search_thing_nodes_by_name("rOO").await.unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].external_id, "root");

    let sources = repository.search_sources_by_name("leaf").await.unwrap();
    assert_eq!(sources.len(), 1);

    let none = repository.search_sinks_by_name("nothing").await.unwrap();
    assert!(none.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn small_batch_sizes_produce_the_same_result(pool: sqlx::PgPool) {
    let repository = PostgresStructureRepository::with_batch_size(pool.clone(), 1);

    repository.synchronize(&chain_structure()).await.unwrap();

    assert_eq!(count(&pool, "thing_node").await, 3);
    assert_eq!(count(&pool, "thingnode_source_association").await, 1);

    let ids = vec![
        node_id(&pool, "root").await,
        node_id(&pool, "mid").await,
        node_id(&pool, "leaf").await,
    ];
    let found = repository.get_thing_nodes_by_ids(&ids).await.unwrap();
    assert_eq!(found.len(), 3);
}

#[sqlx::test(migrations = "./migrations")]
async fn two_stakeholders_can_share_external_ids(pool: sqlx::PgPool) {
    let repository = PostgresStructureRepository::new(pool.clone());

    let structure = CompleteStructure::from_json_str(
        r#"{
            "element_types": [
                {"external_id": "Type1", "stakeholder_key": "SK1", "name": "Type 1"},
                {"external_id": "Type1", "stakeholder_key": "SK2", "name": "Type 1 of SK2"}
            ],
            "thing_nodes": [
                {"external_id": "plant", "stakeholder_key": "SK1", "name": "Plant A",
                 "element_type_external_id": "Type1"},
                {"external_id": "plant", "stakeholder_key": "SK2", "name": "Plant B",
                 "element_type_external_id": "Type1"}
            ]
        }"#,
    )
    .unwrap();
    repository.synchronize(&structure).await.unwrap();

    assert_eq!(count(&pool, "element_type").await, 2);
    assert_eq!(count(&pool, "thing_node").await, 2);

    let roots = repository.get_children(None).await.unwrap();
    assert_eq!(roots.thing_nodes.len(), 2);
}
