use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::TryStreamExt;
use mongodb::bson::{self, oid::ObjectId};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ItemStore, StoreError};
use crate::models::{Item, ItemId, NewItem};

/// A concrete `ItemStore` implementation that uses MongoDB.
///
/// Holds the single shared client for the process and the `items` collection.
pub struct MongoItemStore {
    client: Client,
    collection: Collection<ItemDocument>,
}

/// Document shape for storing items in MongoDB.
#[derive(Serialize, Deserialize, Clone, Debug)]
struct ItemDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    description: String,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    created_at: Option<bson::DateTime>,
}

impl MongoItemStore {
    /// Parses the connection string and builds the client.
    ///
    /// The driver connects lazily, so an unreachable server only shows up on
    /// the first operation. The database is the one named in the URI, or
    /// `fallback_database` when the URI names none.
    pub async fn connect(
        uri: &str,
        fallback_database: &str,
        collection: &str,
    ) -> Result<Self, StoreError> {
        let mut client_options = ClientOptions::parse(uri)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to parse MongoDB URI: {}", e)))?;

        client_options.app_name = Some(env!("CARGO_PKG_NAME").to_string());

        let hosts: Vec<String> = client_options.hosts.iter().map(|h| h.to_string()).collect();
        info!("Connecting to MongoDB at {}", hosts.join(","));

        let client = Client::with_options(client_options)
            .map_err(|e| StoreError::Backend(format!("Failed to create MongoDB client: {}", e)))?;

        let database = client
            .default_database()
            .unwrap_or_else(|| client.database(fallback_database));
        debug!(
            "Using collection '{}' in database '{}'",
            collection,
            database.name()
        );

        Ok(Self {
            collection: database.collection::<ItemDocument>(collection),
            client,
        })
    }

    /// Builds the document for a new item with its id and creation time.
    fn new_item_to_doc(item: &NewItem, now: DateTime<Utc>) -> ItemDocument {
        ItemDocument {
            id: ObjectId::new(),
            name: item.name().to_string(),
            description: item.description().to_string(),
            created_at: Some(bson::DateTime::from_millis(now.timestamp_millis())),
        }
    }

    /// Convert an `ItemDocument` back into an `Item`.
    fn doc_to_item(doc: ItemDocument) -> Item {
        Item {
            id: ItemId::from(doc.id),
            name: doc.name,
            description: doc.description,
            created_at: doc
                .created_at
                .and_then(|dt| DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis())),
        }
    }
}

#[async_trait]
impl ItemStore for MongoItemStore {
    async fn list_items(&self) -> Result<Vec<Item>, StoreError> {
        let cursor = self
            .collection
            .find(None, None)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to query items: {}", e)))?;

        let docs: Vec<ItemDocument> = cursor
            .try_collect()
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to read item document: {}", e)))?;

        Ok(docs.into_iter().map(Self::doc_to_item).collect())
    }

    async fn insert_item(&self, item: NewItem) -> Result<ItemId, StoreError> {
        let doc = Self::new_item_to_doc(&item, Utc::now());
        let id = ItemId::from(doc.id);

        self.collection
            .insert_one(doc, None)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to insert item: {}", e)))?;

        debug!("Inserted item {}", id);
        Ok(id)
    }

    async fn insert_many(&self, items: Vec<NewItem>) -> Result<usize, StoreError> {
        let now = Utc::now();
        let docs: Vec<ItemDocument> = items
            .iter()
            .map(|item| Self::new_item_to_doc(item, now))
            .collect();

        let result = self
            .collection
            .insert_many(docs, None)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to insert items: {}", e)))?;

        Ok(result.inserted_ids.len())
    }

    async fn count_items(&self) -> Result<u64, StoreError> {
        self.collection
            .count_documents(None, None)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to count items: {}", e)))
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
        info!("MongoDB connection closed");
    }

    fn backend_name(&self) -> &str {
        "mongo"
    }
}
