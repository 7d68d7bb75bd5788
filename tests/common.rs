#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, Response};
use axum::Router;
use figment::{
    providers::{Format, Yaml},
    Figment,
};
use itemdemo::config::{self, ConfigV1};
use itemdemo::metrics::Metrics;
use itemdemo::models::{Item, ItemId, NewItem};
use itemdemo::routes::create_router;
use itemdemo::state::AppState;
use itemdemo::store::{create_store, ItemStore, StoreError};

pub const TEST_CONFIG: &str = r#"
version: "1.0.0"
bind_address: 127.0.0.1:3000
logging:
  level: "debug"
  format: "json"
store:
  type: memory
  seed: false
metrics:
  app_label: test-app
  process_metrics: false
"#;

pub fn load_test_config() -> ConfigV1 {
    config::extract(&Figment::new().merge(Yaml::string(TEST_CONFIG)))
        .expect("Failed to parse test config YAML")
}

/// Router over the store configured in `TEST_CONFIG`.
pub async fn build_app() -> (Router, AppState) {
    let config = load_test_config();
    let store = create_store(&config.store).await;
    build_app_with_store(config, store)
}

/// Router over an explicit store, for failure scenarios.
pub fn build_app_with_store(config: ConfigV1, store: Arc<dyn ItemStore>) -> (Router, AppState) {
    let metrics = Metrics::new(&config.metrics).expect("metrics registry should build");
    let state = AppState {
        config: Arc::new(config),
        store,
        metrics,
    };
    (create_router(state.clone()), state)
}

pub fn get(path: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(path)
        .body(Body::empty())
        .expect("failed to build request")
}

pub fn post_json(path: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

pub fn post_form(path: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).expect("body should be JSON")
}

/// Value of the sample line `<name>{...}` whose labels contain every `label="value"` pair.
pub fn sample_value(exposition: &str, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
    exposition
        .lines()
        .filter(|line| line.starts_with(&format!("{}{{", name)))
        .find(|line| {
            labels
                .iter()
                .all(|(k, v)| line.contains(&format!("{}=\"{}\"", k, v)))
        })
        .and_then(|line| line.rsplit(' ').next())
        .and_then(|value| value.parse().ok())
}

/// A store whose every operation fails, standing in for a broken database.
pub struct FailingStore;

#[async_trait]
impl ItemStore for FailingStore {
    async fn list_items(&self) -> Result<Vec<Item>, StoreError> {
        Err(StoreError::Backend("connection reset".into()))
    }

    async fn insert_item(&self, _item: NewItem) -> Result<ItemId, StoreError> {
        Err(StoreError::Backend("connection reset".into()))
    }

    async fn insert_many(&self, _items: Vec<NewItem>) -> Result<usize, StoreError> {
        Err(StoreError::Backend("connection reset".into()))
    }

    async fn count_items(&self) -> Result<u64, StoreError> {
        Err(StoreError::Backend("connection reset".into()))
    }

    fn backend_name(&self) -> &str {
        "failing"
    }
}
