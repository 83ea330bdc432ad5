//! The `RecordStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g.
//! `carefile-store-sqlite`). Higher layers (`carefile-api`, the record
//! service) depend on this abstraction, not on any concrete backend.

use std::collections::BTreeMap;
use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  field::{FieldValue, TrackedField},
  history::{AuditContext, FieldHistory, HealthRecord},
  refdata::{ReferenceDataCode, ReferenceDataDomain},
};

/// Abstraction over a Carefile storage backend.
///
/// `upsert_record` is the field-history engine's single write entry point:
/// it must perform change detection, history append, metadata upsert, and the
/// live-value replacement as one atomic unit. Partial application is a
/// correctness violation and must never be observable to readers.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Aggregate writes ──────────────────────────────────────────────────

  /// Create-or-update the aggregate for `prisoner_number`, considering
  /// exactly the fields present in `values` (clear-and-replace semantics per
  /// field). Fields absent from the map are left untouched: no history row,
  /// no metadata change.
  ///
  /// Returns the set of fields that actually changed by each field's
  /// structural equality rule; an identical proposed value writes nothing.
  fn upsert_record<'a>(
    &'a self,
    prisoner_number: &'a str,
    values: BTreeMap<TrackedField, FieldValue>,
    audit: AuditContext,
  ) -> impl Future<Output = Result<Vec<TrackedField>, Self::Error>> + Send + 'a;

  // ── Aggregate reads ───────────────────────────────────────────────────

  /// The current aggregate: live field values plus metadata pointers.
  /// `None` if the prisoner has no record (records are created lazily on
  /// first write, never on read).
  fn get_record<'a>(
    &'a self,
    prisoner_number: &'a str,
  ) -> impl Future<Output = Result<Option<HealthRecord>, Self::Error>> + Send + 'a;

  // ── History queries ───────────────────────────────────────────────────

  /// All history rows for a prisoner with `created_at` in `[from, until)`,
  /// ordered by `history_id` descending (most recent first).
  fn history_between<'a>(
    &'a self,
    prisoner_number: &'a str,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<FieldHistory>, Self::Error>> + Send + 'a;

  /// The single most recent history row for (prisoner, field) strictly
  /// before `before` — the last-known-value fallback for export windows.
  fn latest_history_before<'a>(
    &'a self,
    prisoner_number: &'a str,
    field: TrackedField,
    before: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<FieldHistory>, Self::Error>> + Send + 'a;

  // ── Reference data ────────────────────────────────────────────────────

  /// All domains with their codes, ordered by `list_sequence` then `code`.
  /// Inactive domains are skipped unless `include_inactive`.
  fn list_domains(
    &self,
    include_inactive: bool,
  ) -> impl Future<Output = Result<Vec<ReferenceDataDomain>, Self::Error>> + Send + '_;

  fn get_domain<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<Option<ReferenceDataDomain>, Self::Error>> + Send + 'a;

  fn get_code<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<ReferenceDataCode>, Self::Error>> + Send + 'a;

  /// Active codes of a domain, ordered by `list_sequence` then `description`.
  fn list_active_codes<'a>(
    &'a self,
    domain: &'a str,
  ) -> impl Future<Output = Result<Vec<ReferenceDataCode>, Self::Error>> + Send + 'a;
}
