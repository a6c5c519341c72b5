//! Application state for the HTTP server.

use std::sync::Arc;

use crate::services::DashboardService;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cached dashboard pipeline over the configured data source
    pub service: Arc<DashboardService>,
}

impl AppState {
    /// Create a new application state around a dashboard service.
    pub fn new(service: Arc<DashboardService>) -> Self {
        Self { service }
    }
}
