// HTTP request handlers
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use structure_sync_repository::StructureRepositoryError;
use structure_sync_shared::CompleteStructure;

use crate::models::{SinkResponse, SourceResponse, StructureResponse, ThingNodeResponse};
use crate::server::state::AppState;

#[derive(Deserialize)]
pub struct StructureQuery {
    #[serde(rename = "parentId")]
    pub parent_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct FilterQuery {
    pub filter: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateQuery {
    #[serde(default)]
    pub overwrite: bool,
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "Structure sync server is running")
}

/// One level of the thing-node hierarchy for lazy loading in the
/// frontend: roots when no parentId is given.
pub async fn get_structure(
    State(state): State<AppState>,
    Query(query): Query<StructureQuery>,
) -> Response {
    match state.repository.get_children(query.parent_id).await {
        Ok(level) => (StatusCode::OK, Json(StructureResponse::new(level))).into_response(),
        Err(error) => error_response(error).into_response(),
    }
}

pub async fn get_single_thing_node(
    State(state): State<AppState>,
    Path(node_id): Path<Uuid>,
) -> Response {
    match state.repository.get_thing_node(node_id).await {
        Ok(node) => (StatusCode::OK, Json(ThingNodeResponse::from(node))).into_response(),
        Err(error) => error_response(error).into_response(),
    }
}

pub async fn get_single_source(
    State(state): State<AppState>,
    Path(source_id): Path<Uuid>,
) -> Response {
    match state.repository.get_source(source_id).await {
        Ok(source) => (StatusCode::OK, Json(SourceResponse::from(source))).into_response(),
        Err(error) => error_response(error).into_response(),
    }
}

pub async fn get_single_sink(State(state): State<AppState>, Path(sink_id): Path<Uuid>) -> Response {
    match state.repository.get_sink(sink_id).await {
        Ok(sink) => (StatusCode::OK, Json(SinkResponse::from(sink))).into_response(),
        Err(error) => error_response(error).into_response(),
    }
}

/// Substring search over source names; an absent filter yields an
/// empty list.
pub async fn get_filtered_sources(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Response {
    let Some(filter) = query.filter else {
        return (StatusCode::OK, Json(Vec::<SourceResponse>::new())).into_response();
    };
    match state.repository.search_sources_by_name(&filter).await {
        Ok(sources) => {
            let sources: Vec<SourceResponse> = sources.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(sources)).into_response()
        }
        Err(error) => error_response(error).into_response(),
    }
}

pub async fn get_filtered_sinks(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Response {
    let Some(filter) = query.filter else {
        return (StatusCode::OK, Json(Vec::<SinkResponse>::new())).into_response();
    };
    match state.repository.search_sinks_by_name(&filter).await {
        Ok(sinks) => {
            let sinks: Vec<SinkResponse> = sinks.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(sinks)).into_response()
        }
        Err(error) => error_response(error).into_response(),
    }
}

/// Replaces or merges the catalog from a complete structure document.
///
/// With `overwrite=true` the existing structure is wiped first; the
/// synchronization itself is atomic either way.
pub async fn update_structure(
    State(state): State<AppState>,
    Query(query): Query<UpdateQuery>,
    Json(structure): Json<CompleteStructure>,
) -> Response {
    if let Err(error) = structure.validate() {
        info!("Rejected invalid structure document: {error}");
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({
                "status": "error",
                "message": format!("Invalid structure document: {error}")
            })),
        )
            .into_response();
    }

    if query.overwrite {
        match state.repository.is_empty().await {
            Ok(false) => {
                info!("Overwrite requested, wiping existing structure");
                if let Err(error) = state.repository.wipe().await {
                    return error_response(error).into_response();
                }
            }
            Ok(true) => {}
            Err(error) => return error_response(error).into_response(),
        }
    }

    match state.repository.synchronize(&structure).await {
        Ok(()) => {
            info!(
                element_types = structure.element_types.len(),
                thing_nodes = structure.thing_nodes.len(),
                sources = structure.sources.len(),
                sinks = structure.sinks.len(),
                "Structure updated"
            );
            StatusCode::NO_CONTENT.into_response()
        }
        Err(error) => error_response(error).into_response(),
    }
}

fn error_response(error: StructureRepositoryError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match &error {
        StructureRepositoryError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        StructureRepositoryError::NotFound(_) => StatusCode::NOT_FOUND,
        StructureRepositoryError::Conflict(_)
        | StructureRepositoryError::Connection(_)
        | StructureRepositoryError::Update(_)
        | StructureRepositoryError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("Store operation failed: {error}");
    } else {
        info!("Request failed: {error}");
    }
    (
        status,
        Json(serde_json::json!({
            "status": "error",
            "message": format!("{error}")
        })),
    )
}
