// Server module - HTTP server setup and routing
pub mod handlers;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, put};
use axum::Router;
use tracing::info;

use structure_sync_repository::StructureRepository;

use crate::config::create_cors_layer;
use crate::errors::ServiceError;
use self::state::AppState;

/// Create the Axum application router with all routes and middleware
pub fn create_app(repository: Arc<dyn StructureRepository>) -> Router {
    let state = AppState { repository };

    Router::new()
        .route("/structure", get(handlers::get_structure))
        .route("/structure/update", put(handlers::update_structure))
        .route("/thingNodes/:node_id", get(handlers::get_single_thing_node))
        .route("/sources", get(handlers::get_filtered_sources))
        .route("/sources/:source_id", get(handlers::get_single_source))
        .route("/sinks", get(handlers::get_filtered_sinks))
        .route("/sinks/:sink_id", get(handlers::get_single_sink))
        .route("/health", get(handlers::health_check))
        .layer(create_cors_layer())
        .with_state(state)
}

/// Run the server on the specified address
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), ServiceError> {
    info!("Server listening on {}", addr);
    info!("- Structure endpoint: http://{}/structure", addr);
    info!("- Update endpoint: http://{}/structure/update", addr);
    info!("- Health endpoint: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
