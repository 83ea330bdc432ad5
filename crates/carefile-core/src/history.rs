//! Field history and metadata — the audit trail behind every write.
//!
//! A [`FieldHistory`] row is an immutable record of one field change; rows are
//! only ever appended. [`FieldMetadata`] is the mutable "current pointer" per
//! (prisoner, field) pair, upserted in place on every change. The engine's
//! invariant: the live value of a field always equals the value in its most
//! recent history row, whenever any history exists.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::field::{FieldValue, TrackedField};

/// Actor identity for unattended writes (event-triggered location refreshes).
/// Always passed explicitly through an [`AuditContext`]; never read from
/// ambient state.
pub const SYSTEM_USERNAME: &str = "CAREFILE_SYSTEM";

// ─── Audit context ───────────────────────────────────────────────────────────

/// Who, when, and where for a single write. Stamped onto every history row
/// and metadata upsert produced by that write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditContext {
  pub at:        DateTime<Utc>,
  pub by:        String,
  /// The prisoner's location/facility id at the time of the write.
  pub prison_id: String,
}

// ─── History ─────────────────────────────────────────────────────────────────

/// One immutable change record for one field. Never updated or deleted in
/// normal operation.
///
/// `history_id` is a surrogate auto-increment key; it is monotonic with
/// creation order and serves as the stable tie-break when two rows share a
/// `created_at` timestamp. `merged_at`/`merged_from` are reserved for a
/// future prisoner-identity-merge flow and are never populated today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldHistory {
  pub history_id:        i64,
  pub prisoner_number:   String,
  pub field:             TrackedField,
  pub value:             FieldValue,
  pub created_at:        DateTime<Utc>,
  pub created_by:        String,
  pub created_in_prison: String,
  pub merged_at:         Option<DateTime<Utc>>,
  pub merged_from:       Option<String>,
}

// ─── Metadata ────────────────────────────────────────────────────────────────

/// The fast "current" projection: exactly one row per (prisoner, field),
/// updated in place each time the field changes. The historical record lives
/// in [`FieldHistory`]; this is never historized itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMetadata {
  pub field:                TrackedField,
  pub last_modified_at:     DateTime<Utc>,
  pub last_modified_by:     String,
  pub last_modified_prison: String,
}

// ─── Aggregate read model ────────────────────────────────────────────────────

/// The raw per-prisoner aggregate as the store returns it: current field
/// values plus their metadata pointers, keyed by field. Code ids are not yet
/// resolved to descriptions — that happens at projection time.
#[derive(Debug, Clone)]
pub struct HealthRecord {
  pub prisoner_number: String,
  pub created_at:      DateTime<Utc>,
  pub values:          BTreeMap<TrackedField, FieldValue>,
  pub metadata:        BTreeMap<TrackedField, FieldMetadata>,
}
