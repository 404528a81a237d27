use std::sync::Arc;

use crate::chat::delivery::DeliveryStrategy;
use crate::storage::ObjectStorage;
use crate::store::ChatStore;
use crate::ws::registry::ConnectionRegistry;

/// Shared application state passed to all handlers via axum State extractor.
/// Collaborators sit behind narrow traits so tests and alternate
/// deployments can substitute them.
#[derive(Clone)]
pub struct AppState {
    /// Persistence collaborator
    pub store: Arc<dyn ChatStore>,
    /// Active connection per user; source of truth for who is online
    pub registry: Arc<ConnectionRegistry>,
    /// Outbound delivery policy (deliver-if-connected by default)
    pub delivery: Arc<dyn DeliveryStrategy>,
    /// Object storage for uploaded file payloads
    pub uploads: Arc<dyn ObjectStorage>,
}
