//! Shared application state.
//!
//! Contains the long-lived objects every handler needs: configuration, the
//! item store (one shared database client) and the metrics registry.

use crate::config::ConfigV1;
use crate::metrics::Metrics;
use crate::store::ItemStore;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Item store backed by the single shared database client.
    pub store: Arc<dyn ItemStore>,
    /// Prometheus registry fed by the request middleware.
    pub metrics: Metrics,
}
