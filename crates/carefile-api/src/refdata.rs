//! Reference-data catalog handlers (read-only).

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use carefile_core::{
  directory::PrisonerDirectory,
  refdata::{ReferenceDataCode, ReferenceDataDomain},
  service::RecordService,
  store::RecordStore,
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct ListDomainsParams {
  #[serde(default)]
  pub include_inactive: bool,
}

pub async fn list_domains<S, D>(
  State(service): State<Arc<RecordService<S, D>>>,
  Query(params): Query<ListDomainsParams>,
) -> Result<Json<Vec<ReferenceDataDomain>>, ApiError>
where
  S: RecordStore + 'static,
  D: PrisonerDirectory + 'static,
{
  let domains = service
    .store()
    .list_domains(params.include_inactive)
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?;
  Ok(Json(domains))
}

pub async fn get_domain<S, D>(
  State(service): State<Arc<RecordService<S, D>>>,
  Path(domain): Path<String>,
) -> Result<Json<ReferenceDataDomain>, ApiError>
where
  S: RecordStore + 'static,
  D: PrisonerDirectory + 'static,
{
  service
    .store()
    .get_domain(&domain)
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?
    .map(Json)
    .ok_or_else(|| carefile_core::Error::DomainNotFound(domain).into())
}

pub async fn get_code<S, D>(
  State(service): State<Arc<RecordService<S, D>>>,
  Path(id): Path<String>,
) -> Result<Json<ReferenceDataCode>, ApiError>
where
  S: RecordStore + 'static,
  D: PrisonerDirectory + 'static,
{
  service
    .store()
    .get_code(&id)
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?
    .map(Json)
    .ok_or_else(|| carefile_core::Error::CodeNotFound(id).into())
}
