//! Diet-and-allergy record handlers.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use carefile_core::{
  directory::PrisonerDirectory,
  service::{
    DietAndAllergyUpdate, DietAndAllergyView, RecordService, SmokerUpdate,
  },
  store::RecordStore,
};

use crate::{actor::Actor, error::ApiError};

pub async fn get_diet_and_allergy<S, D>(
  State(service): State<Arc<RecordService<S, D>>>,
  Path(prisoner_number): Path<String>,
) -> Result<Json<DietAndAllergyView>, ApiError>
where
  S: RecordStore + 'static,
  D: PrisonerDirectory + 'static,
{
  let view = service.get_diet_and_allergy(&prisoner_number).await?;
  Ok(Json(view))
}

/// Create-or-update. Only the fields present in the body are considered;
/// a present-but-empty list clears that field.
pub async fn put_diet_and_allergy<S, D>(
  State(service): State<Arc<RecordService<S, D>>>,
  Path(prisoner_number): Path<String>,
  Actor(username): Actor,
  Json(update): Json<DietAndAllergyUpdate>,
) -> Result<Json<DietAndAllergyView>, ApiError>
where
  S: RecordStore + 'static,
  D: PrisonerDirectory + 'static,
{
  let view = service
    .update_diet_and_allergy(&prisoner_number, update, &username)
    .await?;
  Ok(Json(view))
}

pub async fn put_smoker<S, D>(
  State(service): State<Arc<RecordService<S, D>>>,
  Path(prisoner_number): Path<String>,
  Actor(username): Actor,
  Json(update): Json<SmokerUpdate>,
) -> Result<Json<DietAndAllergyView>, ApiError>
where
  S: RecordStore + 'static,
  D: PrisonerDirectory + 'static,
{
  let view = service
    .update_smoker(&prisoner_number, update, &username)
    .await?;
  Ok(Json(view))
}
