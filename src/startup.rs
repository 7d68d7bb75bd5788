//! Application startup, server initialization and shutdown.
//!
//! This module builds the long-lived objects (metrics registry, item store),
//! starts the bootstrap seeding, serves the router and closes the database
//! connection once the server has stopped.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::ConfigV1;
use crate::metrics::{Metrics, MetricsError};
use crate::models::item::sample_items;
use crate::routes;
use crate::state::AppState;
use crate::store::{create_store, seed_if_empty, ItemStore, SeedOutcome};

/// Builds the shared state: registry first (a collision there is fatal), then the store.
pub async fn build_state(config: Arc<ConfigV1>) -> Result<AppState, MetricsError> {
    let metrics = Metrics::new(&config.metrics)?;
    let store = create_store(&config.store).await;

    Ok(AppState {
        config,
        store,
        metrics,
    })
}

/// Runs the one-time bootstrap and logs its outcome. Failures are logged, never fatal.
pub async fn bootstrap_store(store: &dyn ItemStore) -> Option<SeedOutcome> {
    match seed_if_empty(store, sample_items()).await {
        Ok(outcome) => {
            match outcome {
                SeedOutcome::Seeded(count) => info!("{} sample items inserted", count),
                SeedOutcome::AlreadyPopulated(count) => {
                    info!("Sample data already exists ({} items)", count)
                }
            }
            Some(outcome)
        }
        Err(e) => {
            error!("Error seeding the item store: {}", e);
            None
        }
    }
}

/// Resolves when the process receives an interrupt (Ctrl-C / SIGINT).
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for the interrupt signal: {}", e);
        return;
    }
    info!("Interrupt received, shutting down");
}

/// Initializes and runs the application server.
///
/// Binds to the configured address, serves requests until an interrupt
/// arrives, waits for in-flight requests and finally closes the store.
///
/// # Errors
///
/// Returns an error if metrics registration fails, the address cannot be
/// bound, or the server fails while running.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let state = build_state(config.clone()).await?;
    let store = state.store.clone();

    if config.store.seed {
        let seed_store = store.clone();
        tokio::spawn(async move {
            bootstrap_store(seed_store.as_ref()).await;
        });
    }

    let app = routes::create_router(state);

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("Server is running on {}", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    info!("Item store closed, exiting");

    Ok(())
}
