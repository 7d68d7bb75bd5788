use super::{ItemStore, StoreError};
use crate::models::{Item, ItemId, NewItem};
use async_trait::async_trait;

/// Stand-in used when the configured backend could not be built at startup.
/// Every call fails with the startup reason, so item routes answer 500
/// while the rest of the HTTP surface keeps working.
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: impl Into<String>) -> Self {
        UnavailableStore {
            reason: reason.into(),
        }
    }

    fn error(&self) -> StoreError {
        StoreError::Unavailable(self.reason.clone())
    }
}

#[async_trait]
impl ItemStore for UnavailableStore {
    async fn list_items(&self) -> Result<Vec<Item>, StoreError> {
        Err(self.error())
    }

    async fn insert_item(&self, _item: NewItem) -> Result<ItemId, StoreError> {
        Err(self.error())
    }

    async fn insert_many(&self, _items: Vec<NewItem>) -> Result<usize, StoreError> {
        Err(self.error())
    }

    async fn count_items(&self) -> Result<u64, StoreError> {
        Err(self.error())
    }

    fn backend_name(&self) -> &str {
        "unavailable"
    }
}
