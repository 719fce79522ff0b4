// Shared state for HTTP handlers
use std::sync::Arc;

use structure_sync_repository::StructureRepository;

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn StructureRepository>,
}
