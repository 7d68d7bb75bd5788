//! The HTML page served at `/`.

use axum::response::Html;
use axum::{routing::get, Router};

use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Registers the index route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(index))
}

/// Static form plus a small script that loads `/items` and posts new ones.
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
