//! HTTP route definitions and handlers.
//!
//! This module organizes all HTTP endpoints into logical groups:
//! the HTML page, the item API and metrics exposition.

mod index_routes;
mod item_routes;
mod metrics_routes;

use crate::metrics::track_http_metrics;
use crate::state::AppState;
use axum::middleware::from_fn_with_state;
use axum::Router;

/// Creates the application router with all configured routes.
///
/// The metrics middleware is added with `layer`, so it also wraps the
/// fallback and sees unmatched paths.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(index_routes::routes())
        .merge(item_routes::routes())
        .merge(metrics_routes::routes())
        .layer(from_fn_with_state(state.metrics.clone(), track_http_metrics))
        .with_state(state)
}
