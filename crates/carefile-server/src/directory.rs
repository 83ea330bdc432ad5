//! HTTP prisoner-directory adapter.
//!
//! Backed by the upstream prisoner-search service. A `404` from the upstream
//! is a definitive negative lookup and maps to `Ok(None)`; any other failure
//! is a transport error for the caller to surface as an infrastructure
//! problem.

use carefile_core::directory::{PrisonerDirectory, PrisonerSummary};
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
  #[error("prisoner search request failed: {0}")]
  Transport(#[from] reqwest::Error),
  #[error("prisoner search returned unexpected status {0}")]
  UnexpectedStatus(StatusCode),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
  prisoner_number: String,
  prison_id:       String,
  #[serde(default)]
  prison_name:     String,
}

pub struct HttpPrisonerDirectory {
  client:   reqwest::Client,
  base_url: String,
}

impl HttpPrisonerDirectory {
  pub fn new(base_url: impl Into<String>) -> Self {
    let base_url = base_url.into().trim_end_matches('/').to_owned();
    Self { client: reqwest::Client::new(), base_url }
  }
}

impl PrisonerDirectory for HttpPrisonerDirectory {
  type Error = DirectoryError;

  async fn lookup(
    &self,
    prisoner_number: &str,
  ) -> Result<Option<PrisonerSummary>, Self::Error> {
    let url = format!("{}/prisoner/{prisoner_number}", self.base_url);
    let response = self.client.get(&url).send().await?;

    match response.status() {
      StatusCode::NOT_FOUND => Ok(None),
      status if status.is_success() => {
        let body: SearchResponse = response.json().await?;
        Ok(Some(PrisonerSummary {
          prisoner_number: body.prisoner_number,
          prison_id:       body.prison_id,
          prison_name:     body.prison_name,
        }))
      }
      status => Err(DirectoryError::UnexpectedStatus(status)),
    }
  }
}
