use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info};

use super::memory_store::MemoryItemStore;
use super::mongodb_store::MongoItemStore;
use super::unavailable_store::UnavailableStore;
use crate::config::{StoreBackend, StoreConfig};
use crate::models::{Item, ItemId, NewItem};

/// Any failure coming out of the storage layer. There are no retries: one error per call.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("item store is unavailable: {0}")]
    Unavailable(String),
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// The ItemStore trait abstracts the item collection (list, insert, count).
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Returns every item in storage-native order.
    async fn list_items(&self) -> Result<Vec<Item>, StoreError>;
    /// Stores the item with a server-assigned creation timestamp.
    async fn insert_item(&self, item: NewItem) -> Result<ItemId, StoreError>;
    /// Stores all items in one call and returns how many were written.
    async fn insert_many(&self, items: Vec<NewItem>) -> Result<usize, StoreError>;
    async fn count_items(&self) -> Result<u64, StoreError>;
    /// Releases the underlying connection. Called once at shutdown.
    async fn close(&self) {}
    fn backend_name(&self) -> &str;
}

/// Result of the startup bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded(usize),
    AlreadyPopulated(u64),
}

/// Inserts `samples` only when the collection is empty.
pub async fn seed_if_empty(
    store: &dyn ItemStore,
    samples: Vec<NewItem>,
) -> Result<SeedOutcome, StoreError> {
    let count = store.count_items().await?;
    if count > 0 {
        return Ok(SeedOutcome::AlreadyPopulated(count));
    }
    let inserted = store.insert_many(samples).await?;
    Ok(SeedOutcome::Seeded(inserted))
}

/// Creates a concrete store implementation based on the StoreConfig.
///
/// A MongoDB backend that cannot be built does not stop the process: the
/// returned `UnavailableStore` fails every call with the startup reason.
pub async fn create_store(config: &StoreConfig) -> Arc<dyn ItemStore> {
    match config.backend {
        StoreBackend::Memory => {
            info!("Using in-memory item store.");
            Arc::new(MemoryItemStore::new())
        }
        StoreBackend::MongoDB => {
            let Some(uri) = config.uri.as_deref().filter(|uri| !uri.is_empty()) else {
                error!("No MongoDB connection string configured (set MONGO_URI).");
                return Arc::new(UnavailableStore::new("no connection string configured"));
            };
            match MongoItemStore::connect(uri, &config.database, &config.collection).await {
                Ok(store) => {
                    info!("Successfully created MongoDB item store.");
                    Arc::new(store)
                }
                Err(e) => {
                    error!("Failed to create MongoDB item store: {}", e);
                    Arc::new(UnavailableStore::new(e.to_string()))
                }
            }
        }
    }
}
