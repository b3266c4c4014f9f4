/**
 * Error Conversion
 *
 * `BackendError` implements `IntoResponse`, so handlers return it directly.
 *
 * # Response Format
 *
 * ```json
 * {
 *   "message": "User already exists",
 *   "status": 400
 * }
 * ```
 *
 * Server-side failures are logged here with their full detail; the body only
 * carries the generic message.
 */

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use crate::backend::error::types::BackendError;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.message();

        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            tracing::error!(status = status.as_u16(), error = %self, "[Backend] Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "[Backend] Request rejected");
        }

        let body = serde_json::json!({
            "message": message,
            "status": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}
