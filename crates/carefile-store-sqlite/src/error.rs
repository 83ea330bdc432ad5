//! Error type for `carefile-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] carefile_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A history or value row must populate exactly one of the four typed
  /// slots. Raised when a read finds zero or several populated.
  #[error("field {field}: {populated} value slots populated, expected exactly 1")]
  ValueSlots { field: String, populated: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
