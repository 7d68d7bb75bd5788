use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use super::{ItemStore, StoreError};
use crate::models::{Item, ItemId, NewItem};

/// A process-local store keeping items in insertion order.
/// Handy for local runs without a database and for tests.
#[derive(Default)]
pub struct MemoryItemStore {
    items: RwLock<Vec<Item>>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn list_items(&self) -> Result<Vec<Item>, StoreError> {
        Ok(self.items.read().await.clone())
    }

    async fn insert_item(&self, item: NewItem) -> Result<ItemId, StoreError> {
        let id = ItemId::from(ObjectId::new());
        self.items
            .write()
            .await
            .push(item.into_item(id.clone(), Utc::now()));
        Ok(id)
    }

    async fn insert_many(&self, items: Vec<NewItem>) -> Result<usize, StoreError> {
        let now = Utc::now();
        let mut guard = self.items.write().await;
        let count = items.len();
        guard.extend(
            items
                .into_iter()
                .map(|item| item.into_item(ObjectId::new().into(), now)),
        );
        Ok(count)
    }

    async fn count_items(&self) -> Result<u64, StoreError> {
        Ok(self.items.read().await.len() as u64)
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
