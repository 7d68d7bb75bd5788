//! Item listing and creation endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::models::{Item, ItemId, NewItem};
use crate::state::AppState;
use crate::utils::http_helpers::{HTTPError, ItemPayload};

/// Registers item routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/items", get(list_items).post(create_item))
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemResponse {
    pub success: bool,
    pub message: String,
    pub item_id: ItemId,
}

/// Returns every stored item as a JSON array.
async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<Item>>, HTTPError> {
    let items = state.store.list_items().await.map_err(|e| {
        error!("Error fetching items: {}", e);
        HTTPError::internal("Error fetching items from database")
    })?;
    Ok(Json(items))
}

/// Validates the payload and inserts a new item.
async fn create_item(
    State(state): State<AppState>,
    payload: ItemPayload,
) -> Result<(StatusCode, Json<CreateItemResponse>), HTTPError> {
    let item = NewItem::validate(payload.name, payload.description)
        .map_err(|e| HTTPError::bad_request(e.to_string()))?;

    let item_id = state.store.insert_item(item).await.map_err(|e| {
        error!("Error adding item: {}", e);
        HTTPError::internal("Error adding item to database")
    })?;

    Ok((
        StatusCode::CREATED,
        Json(CreateItemResponse {
            success: true,
            message: "Item added successfully".to_string(),
            item_id,
        }),
    ))
}
