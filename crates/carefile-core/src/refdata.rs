//! Reference data — governed vocabularies of valid coded values.
//!
//! Every coded attribute on a health record points into one of these domains.
//! Codes are validated against their domain on write and translated to
//! descriptions on read; history rows store only the code id so that a later
//! description edit never falsifies old history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Domain ──────────────────────────────────────────────────────────────────

/// A category of coded values, e.g. `FOOD_ALLERGY`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceDataDomain {
  /// Unique key, conventionally SCREAMING_SNAKE.
  pub code:           String,
  pub description:    String,
  /// Display order; 0 means "alphabetical default".
  pub list_sequence:  i64,
  pub created_at:     DateTime<Utc>,
  pub created_by:     String,
  pub deactivated_at: Option<DateTime<Utc>>,
  pub deactivated_by: Option<String>,
  /// Codes in display order.
  pub codes:          Vec<ReferenceDataCode>,
}

impl ReferenceDataDomain {
  /// Active iff `deactivated_at` is null or in the future.
  pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
    self.deactivated_at.is_none_or(|d| d > at)
  }

  pub fn is_active(&self) -> bool { self.is_active_at(Utc::now()) }
}

// ─── Code ────────────────────────────────────────────────────────────────────

/// A single coded value within a domain.
///
/// The id is globally unique and conventionally `{domain}_{code}`
/// (e.g. `FOOD_ALLERGY_MILK`). Identity is immutable; description and
/// lifecycle may change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceDataCode {
  pub id:             String,
  pub domain:         String,
  pub code:           String,
  pub description:    String,
  pub list_sequence:  i64,
  pub created_at:     DateTime<Utc>,
  pub created_by:     String,
  pub deactivated_at: Option<DateTime<Utc>>,
  pub deactivated_by: Option<String>,
}

impl ReferenceDataCode {
  pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
    self.deactivated_at.is_none_or(|d| d > at)
  }

  pub fn is_active(&self) -> bool { self.is_active_at(Utc::now()) }
}

// ─── Read-time descriptor ────────────────────────────────────────────────────

/// The compact shape a coded value takes in API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeDescriptor {
  pub id:          String,
  pub code:        String,
  pub description: String,
}

impl From<&ReferenceDataCode> for CodeDescriptor {
  fn from(c: &ReferenceDataCode) -> Self {
    Self {
      id:          c.id.clone(),
      code:        c.code.clone(),
      description: c.description.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn code(deactivated_at: Option<DateTime<Utc>>) -> ReferenceDataCode {
    ReferenceDataCode {
      id: "FOOD_ALLERGY_MILK".into(),
      domain: "FOOD_ALLERGY".into(),
      code: "MILK".into(),
      description: "Milk".into(),
      list_sequence: 0,
      created_at: Utc::now(),
      created_by: "SEED".into(),
      deactivated_at,
      deactivated_by: None,
    }
  }

  #[test]
  fn code_without_deactivation_is_active() {
    assert!(code(None).is_active());
  }

  #[test]
  fn code_with_future_deactivation_is_still_active() {
    let future = Utc::now() + chrono::Duration::days(30);
    assert!(code(Some(future)).is_active());
  }

  #[test]
  fn code_with_past_deactivation_is_inactive() {
    let past = Utc::now() - chrono::Duration::days(30);
    assert!(!code(Some(past)).is_active());
  }
}
