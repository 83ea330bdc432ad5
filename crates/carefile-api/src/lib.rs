//! JSON REST API for Carefile.
//!
//! Exposes an axum [`Router`] backed by any
//! [`carefile_core::store::RecordStore`] and
//! [`carefile_core::directory::PrisonerDirectory`]. Auth, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(carefile_api::api_router(service.clone()))
//! ```

pub mod actor;
pub mod error;
pub mod events;
pub mod health;
pub mod refdata;
pub mod sar;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use carefile_core::{
  directory::PrisonerDirectory, service::RecordService, store::RecordStore,
};

pub use error::ApiError;

#[cfg(test)] mod tests;

/// Build a fully-materialised API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, D>(service: Arc<RecordService<S, D>>) -> Router<()>
where
  S: RecordStore + 'static,
  D: PrisonerDirectory + 'static,
{
  Router::new()
    // Health record
    .route(
      "/prisoners/{prisoner_number}/diet-and-allergy",
      get(health::get_diet_and_allergy::<S, D>)
        .put(health::put_diet_and_allergy::<S, D>),
    )
    .route(
      "/prisoners/{prisoner_number}/smoker",
      put(health::put_smoker::<S, D>),
    )
    // Subject access
    .route(
      "/subject-access-request",
      get(sar::subject_access_request::<S, D>),
    )
    // Reference data
    .route("/reference-data/domains", get(refdata::list_domains::<S, D>))
    .route(
      "/reference-data/domains/{domain}",
      get(refdata::get_domain::<S, D>),
    )
    .route("/reference-data/codes/{id}", get(refdata::get_code::<S, D>))
    // Inbound events
    .route("/events", post(events::receive_event::<S, D>))
    .with_state(service)
}
