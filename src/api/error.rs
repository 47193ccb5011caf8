// =============================================================================
// API error mapping
// =============================================================================
//
//   InvalidParameter      -> 400
//   unknown symbol        -> 404
//   MalformedSeries       -> 422
//   collector / mail      -> 502
//   deadline exceeded     -> 504
//
// Indicator-level gaps never reach this layer; they are 200 responses with
// explicit markers inside the bundle.
// =============================================================================

use axum::{
    extract::Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::{InsightError, ServiceError};

#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl From<InsightError> for ApiError {
    fn from(err: InsightError) -> Self {
        let status = match err {
            InsightError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            InsightError::MalformedSeries { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        };
        Self::new(status, err.to_string())
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let status = match &err {
            ServiceError::Insight(inner) => return inner.clone().into(),
            ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::Upstream(_) | ServiceError::Mail(_) => StatusCode::BAD_GATEWAY,
            ServiceError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.status.canonical_reason().unwrap_or("error"),
            "detail": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}
