use std::sync::Arc;

use agency_core::storage::BlobStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: agency_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// External blob storage for project files and receipts.
    pub blob_store: Arc<dyn BlobStore>,
}
