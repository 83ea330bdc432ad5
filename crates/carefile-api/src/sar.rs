//! Subject-access-request export handler.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use carefile_core::{
  directory::PrisonerDirectory, service::RecordService, store::RecordStore,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SarParams {
  /// Prisoner reference number.
  pub prn:       String,
  #[serde(rename = "fromDate")]
  pub from_date: Option<NaiveDate>,
  #[serde(rename = "toDate")]
  pub to_date:   Option<NaiveDate>,
}

/// `200` with the report, or `204` when the prisoner has no recorded data in
/// or before the window.
pub async fn subject_access_request<S, D>(
  State(service): State<Arc<RecordService<S, D>>>,
  Query(params): Query<SarParams>,
) -> Result<Response, ApiError>
where
  S: RecordStore + 'static,
  D: PrisonerDirectory + 'static,
{
  let report = service
    .subject_access_export(&params.prn, params.from_date, params.to_date)
    .await?;
  Ok(match report {
    Some(report) => (StatusCode::OK, Json(report)).into_response(),
    None => StatusCode::NO_CONTENT.into_response(),
  })
}
