use axum::async_trait;
use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::item::MISSING_FIELDS_MESSAGE;

/// JSON body of every error response: `{"error": "..."}`.
#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

/// A general purpose HTTP error type that can be converted into an `IntoResponse`.
#[derive(Debug)]
pub struct HTTPError {
    status: StatusCode,
    message: String,
}

impl HTTPError {
    /// Creates a new HTTP error with the given status code and message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        HTTPError {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// Converts our `HTTPError` into a JSON HTTP response.
impl IntoResponse for HTTPError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Raw insert payload, accepted as JSON or as an urlencoded form.
///
/// Fields stay optional here; presence is checked by `NewItem::validate`.
#[derive(Deserialize, Debug, Default, PartialEq, Eq)]
pub struct ItemPayload {
    pub name: Option<String>,
    pub description: Option<String>,
}

fn is_form_content(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

/// Extractor implementation: picks the body format from the `content-type`
/// header. Any body that cannot be read as an item payload is a 400.
#[async_trait]
impl<S> FromRequest<S> for ItemPayload
where
    S: Send + Sync,
{
    type Rejection = HTTPError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let parsed = if is_form_content(&request) {
            Form::<ItemPayload>::from_request(request, state)
                .await
                .map(|Form(payload)| payload)
                .map_err(|e| e.body_text())
        } else {
            Json::<ItemPayload>::from_request(request, state)
                .await
                .map(|Json(payload)| payload)
                .map_err(|e| e.body_text())
        };

        parsed.map_err(|reason| {
            debug!("Rejected item payload: {}", reason);
            HTTPError::bad_request(MISSING_FIELDS_MESSAGE)
        })
    }
}
