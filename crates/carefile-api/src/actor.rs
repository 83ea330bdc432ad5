//! Actor-identity extractor.
//!
//! Every write endpoint requires the acting username in the `X-Username`
//! header; it is threaded explicitly into the audit context. Unattended
//! writes (the event intake) use the system sentinel instead and never go
//! through this extractor.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;

/// The authenticated username performing a write.
#[derive(Debug, Clone)]
pub struct Actor(pub String);

impl<S> FromRequestParts<S> for Actor
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    parts
      .headers
      .get("x-username")
      .and_then(|v| v.to_str().ok())
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(|s| Actor(s.to_owned()))
      .ok_or_else(|| {
        ApiError::Validation("missing or empty X-Username header".into())
      })
  }
}
