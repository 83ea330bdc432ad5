//! Inbound domain-event intake.
//!
//! Delivery is at-least-once over plain HTTP, so every recognised event must
//! be idempotent and unknown event types are acknowledged rather than
//! rejected. A rejection would only cause the publisher to redeliver an event
//! we will never handle.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use carefile_core::{
  directory::PrisonerDirectory, service::RecordService, store::RecordStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

/// A prisoner arrived at (or returned to) an establishment; their recorded
/// location may be stale.
pub const PRISONER_RECEIVED: &str = "prisoner.received";
/// Two prisoner identities were merged upstream. Acknowledged but not yet
/// acted on; the history schema reserves merge columns for it.
pub const PRISONER_MERGED: &str = "prisoner.merged";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainEvent {
  pub message_id:              Uuid,
  pub event_type:              String,
  pub prisoner_number:         String,
  /// Populated on merge events only: the identity that was retired.
  pub removed_prisoner_number: Option<String>,
}

pub async fn receive_event<S, D>(
  State(service): State<Arc<RecordService<S, D>>>,
  Json(event): Json<DomainEvent>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore + 'static,
  D: PrisonerDirectory + 'static,
{
  match event.event_type.as_str() {
    PRISONER_RECEIVED => {
      let refreshed = service.refresh_location(&event.prisoner_number).await?;
      tracing::info!(
        message_id = %event.message_id,
        prisoner_number = %event.prisoner_number,
        refreshed,
        "processed prisoner-received event"
      );
    }
    PRISONER_MERGED => {
      tracing::info!(
        message_id = %event.message_id,
        prisoner_number = %event.prisoner_number,
        removed = ?event.removed_prisoner_number,
        "acknowledged prisoner-merged event; merge handling not implemented"
      );
    }
    other => {
      tracing::warn!(
        message_id = %event.message_id,
        event_type = %other,
        "ignoring unrecognised event type"
      );
    }
  }
  Ok(StatusCode::NO_CONTENT)
}
