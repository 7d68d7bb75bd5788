use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Configuration of the item store.
/// - type: which backend to build (mongo or memory).
/// - uri: MongoDB connection string, usually supplied through `MONGO_URI`.
/// - database: used only when the URI names no default database.
/// - seed: insert the sample items at startup when the collection is empty.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
#[serde(default)]
pub struct StoreConfig {
    #[serde(rename = "type")]
    pub backend: StoreBackend,
    pub uri: Option<String>,
    pub database: String,
    pub collection: String,
    pub seed: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            backend: StoreBackend::MongoDB,
            uri: None,
            database: "test".to_string(),
            collection: "items".to_string(),
            seed: true,
        }
    }
}

/// The existing store backends. We differentiate them via a "type" key in the YAML.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, JsonSchema)]
pub enum StoreBackend {
    #[serde(rename = "mongo")]
    MongoDB,
    #[serde(rename = "memory")]
    Memory,
}
