use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bridgewatch_core::CoreError;
use serde_json::json;

/// Handler error rendered as `{"error": "<message>"}`
#[derive(Debug)]
pub enum ApiError {
    Core(CoreError),
    BadRequest(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::Core(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(CoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Core(CoreError::InvalidReading(_) | CoreError::Validation(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Core(err) => {
                if !err.is_client_error() {
                    tracing::error!(error = %err, "Request failed");
                }
                err.to_string()
            }
            ApiError::BadRequest(msg) => msg,
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
