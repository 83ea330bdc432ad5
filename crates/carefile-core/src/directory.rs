//! The prisoner-directory adapter trait.
//!
//! Resolves a prisoner number to their current location and confirms the
//! identifier exists. A definitive negative lookup is `Ok(None)`; transport
//! failures are `Err` — the service maps the former to a validation error and
//! propagates the latter as an infrastructure failure.

use std::future::Future;

/// What the upstream directory knows about a prisoner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrisonerSummary {
  pub prisoner_number: String,
  /// Current location/facility id, e.g. `"LEI"`.
  pub prison_id:       String,
  pub prison_name:     String,
}

pub trait PrisonerDirectory: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn lookup<'a>(
    &'a self,
    prisoner_number: &'a str,
  ) -> impl Future<Output = Result<Option<PrisonerSummary>, Self::Error>> + Send + 'a;
}
