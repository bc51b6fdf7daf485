use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use mcs_core::HostingError;

/// Handler failure rendered as `{"detail": ...}` with its status code.
#[derive(Debug)]
pub enum ApiError {
    Hosting(HostingError),
    /// The request body could not be read as the expected JSON.
    Body(JsonRejection),
}

impl From<HostingError> for ApiError {
    fn from(err: HostingError) -> Self {
        Self::Hosting(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Body(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Hosting(err) => {
                let status = StatusCode::from_u16(err.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if status.is_server_error() {
                    tracing::error!(status = status.as_u16(), error = %err, "request failed");
                }
                (status, err.to_string())
            }
            ApiError::Body(rejection) => (rejection.status(), rejection.body_text()),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
