//! Error types for `carefile-core`.

use thiserror::Error;

use crate::field::ValueKind;

#[derive(Debug, Error)]
pub enum Error {
  /// The prisoner number could not be confirmed by the directory adapter.
  /// This is a validation error, not an infrastructure failure.
  #[error("prisoner not found: {0}")]
  PrisonerNotFound(String),

  #[error("invalid reference code for {field}: {id:?}")]
  InvalidReferenceCode { field: &'static str, id: String },

  #[error("no health record exists for prisoner {0}")]
  RecordNotFound(String),

  #[error("reference data domain not found: {0}")]
  DomainNotFound(String),

  #[error("reference data code not found: {0}")]
  CodeNotFound(String),

  #[error("unknown tracked field: {0:?}")]
  UnknownField(String),

  /// The proposed value populates a different typed slot than the one the
  /// field declares.
  #[error("field {field}: {found:?} value does not fit the declared {expected:?} slot")]
  ValueKindMismatch {
    field:    &'static str,
    expected: ValueKind,
    found:    ValueKind,
  },

  /// Wrapped storage-backend failure.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// Wrapped directory-adapter transport failure. Distinct from
  /// [`Error::PrisonerNotFound`], which is a definitive negative lookup.
  #[error("prisoner directory error: {0}")]
  Directory(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
