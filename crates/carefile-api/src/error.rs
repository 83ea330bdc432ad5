//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Bad request-shaped input: unknown reference code, prisoner number not
  /// found, malformed field payload. Never retried automatically.
  #[error("validation failure: {0}")]
  Validation(String),

  #[error("not found: {0}")]
  NotFound(String),

  /// Upstream adapter unreachable or misbehaving.
  #[error("upstream failure: {0}")]
  Upstream(String),

  #[error("internal error: {0}")]
  Internal(String),
}

impl From<carefile_core::Error> for ApiError {
  fn from(e: carefile_core::Error) -> Self {
    use carefile_core::Error as E;
    match e {
      E::PrisonerNotFound(_)
      | E::InvalidReferenceCode { .. }
      | E::UnknownField(_)
      | E::ValueKindMismatch { .. } => Self::Validation(e.to_string()),
      E::RecordNotFound(_) | E::DomainNotFound(_) | E::CodeNotFound(_) => {
        Self::NotFound(e.to_string())
      }
      E::Directory(_) => Self::Upstream(e.to_string()),
      E::Store(_) => Self::Internal(e.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Validation(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Upstream(m) => (StatusCode::BAD_GATEWAY, m.clone()),
      ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
    };
    if status.is_server_error() {
      tracing::error!(%status, message, "request failed");
    }
    (status, Json(json!({ "error": message }))).into_response()
  }
}
