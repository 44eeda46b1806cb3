//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use pumphouse_domain::error::PumphouseError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`PumphouseError`] to an HTTP response with appropriate status code.
pub struct ApiError(PumphouseError);

impl From<PumphouseError> for ApiError {
    fn from(err: PumphouseError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            PumphouseError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            PumphouseError::ConfigMissing => (StatusCode::NOT_FOUND, self.0.to_string()),
            other => {
                tracing::error!(error = %other, "internal error serving API request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
