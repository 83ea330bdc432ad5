//! Subject-access export — a human-readable reconstruction of every field
//! change for one prisoner in a date range.
//!
//! The transform merges in-window history with a "last known value before the
//! window" fallback per field, so a field with zero in-window activity still
//! appears once if it ever had a value. Code ids are translated to
//! descriptions at export time; an id that no longer resolves degrades to the
//! [`UNKNOWN_VALUE`] placeholder instead of failing — the one place missing
//! data is absorbed rather than surfaced.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{field::FieldValue, history::FieldHistory};

/// Placeholder for a reference code that no longer resolves.
pub const UNKNOWN_VALUE: &str = "Unknown";

// ─── Report shapes ───────────────────────────────────────────────────────────

/// One translated change record. `field` is the human-readable category
/// label; `value` is the flattened payload (an array of `{value, comment}`
/// for selection fields, a bare string for scalars).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarEntry {
  pub field:            String,
  pub value:            serde_json::Value,
  pub last_modified_at: DateTime<Utc>,
  pub last_modified_by: String,
  pub prison_id:        String,
}

/// The full export. `content` is order-significant: most recently changed
/// first, ties broken by creation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarReport {
  pub prisoner_number: String,
  pub from_date:       NaiveDate,
  pub to_date:         NaiveDate,
  pub content:         Vec<SarEntry>,
}

// ─── Window bounds ───────────────────────────────────────────────────────────

/// Resolved query window: `[start, until)` in UTC, plus the civil dates echoed
/// back in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportWindow {
  pub start:     DateTime<Utc>,
  pub until:     DateTime<Utc>,
  pub from_date: NaiveDate,
  pub to_date:   NaiveDate,
}

/// Epoch-like floor used when no `from` date is given.
fn floor_date() -> NaiveDate {
  NaiveDate::from_ymd_opt(1800, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Default missing bounds and convert to start-of-day / end-of-day UTC
/// instants. The upper bound is exclusive: start of the day after `to`.
pub fn export_window(
  from: Option<NaiveDate>,
  to: Option<NaiveDate>,
) -> ExportWindow {
  let from_date = from.unwrap_or_else(floor_date);
  let to_date = to.unwrap_or_else(|| Utc::now().date_naive());

  let start = from_date.and_time(NaiveTime::MIN).and_utc();
  let until = to_date
    .succ_opt()
    .unwrap_or(to_date)
    .and_time(NaiveTime::MIN)
    .and_utc();

  ExportWindow { start, until, from_date, to_date }
}

// ─── Merge ───────────────────────────────────────────────────────────────────

/// Merge in-window rows with pre-window fallbacks into one sequence ordered
/// by `history_id` descending. The id is monotonic with creation order, so it
/// is also the tie-break for simultaneous writes.
pub fn merge_descending(
  in_window: Vec<FieldHistory>,
  fallbacks: Vec<FieldHistory>,
) -> Vec<FieldHistory> {
  let mut merged = in_window;
  merged.extend(fallbacks);
  merged.sort_by(|a, b| b.history_id.cmp(&a.history_id));
  merged
}

// ─── Translation ─────────────────────────────────────────────────────────────

/// The reference code ids embedded in a history value, in snapshot order.
pub fn code_ids(value: &FieldValue) -> Vec<&str> {
  match value {
    FieldValue::Code(id) => vec![id.as_str()],
    FieldValue::Selections(items) => {
      items.iter().map(|s| s.value.as_str()).collect()
    }
    FieldValue::Int(_) | FieldValue::Text(_) => Vec::new(),
  }
}

/// Flatten a history value for the report, replacing each code id with its
/// resolved description. `resolve` returning `None` is the tolerated
/// degradation case and substitutes [`UNKNOWN_VALUE`].
pub fn flatten_value(
  value: &FieldValue,
  resolve: impl Fn(&str) -> Option<String>,
) -> serde_json::Value {
  let describe =
    |id: &str| resolve(id).unwrap_or_else(|| UNKNOWN_VALUE.to_owned());

  match value {
    FieldValue::Int(n) => json!(n),
    FieldValue::Text(t) => json!(t),
    FieldValue::Code(id) => json!(describe(id)),
    FieldValue::Selections(items) => json!(
      items
        .iter()
        .map(|s| json!({ "value": describe(&s.value), "comment": s.comment }))
        .collect::<Vec<_>>()
    ),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::field::{Selection, TrackedField};

  fn entry(history_id: i64, field: TrackedField) -> FieldHistory {
    FieldHistory {
      history_id,
      prisoner_number: "A1234AA".into(),
      field,
      value: FieldValue::Text("x".into()),
      created_at: Utc::now(),
      created_by: "USER1".into(),
      created_in_prison: "LEI".into(),
      merged_at: None,
      merged_from: None,
    }
  }

  #[test]
  fn window_defaults_to_floor_and_today() {
    let w = export_window(None, None);
    assert_eq!(w.from_date, NaiveDate::from_ymd_opt(1800, 1, 1).unwrap());
    assert_eq!(w.to_date, Utc::now().date_naive());
    assert!(w.start < w.until);
  }

  #[test]
  fn window_upper_bound_is_exclusive_next_day() {
    let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let w = export_window(Some(day), Some(day));
    assert_eq!(w.until - w.start, chrono::Duration::days(1));
  }

  #[test]
  fn merge_orders_by_id_descending_across_both_sets() {
    let merged = merge_descending(
      vec![entry(7, TrackedField::FoodAllergy), entry(4, TrackedField::Smoker)],
      vec![entry(2, TrackedField::MedicalDiet)],
    );
    let ids: Vec<_> = merged.iter().map(|h| h.history_id).collect();
    assert_eq!(ids, vec![7, 4, 2]);
  }

  #[test]
  fn flatten_substitutes_unknown_for_unresolvable_codes() {
    let value = FieldValue::Selections(vec![Selection {
      value:   "FOOD_ALLERGY_GONE".into(),
      comment: Some("old".into()),
    }]);
    let flat = flatten_value(&value, |_| None);
    assert_eq!(flat[0]["value"], UNKNOWN_VALUE);
    assert_eq!(flat[0]["comment"], "old");
  }

  #[test]
  fn flatten_resolves_known_codes_to_descriptions() {
    let value = FieldValue::Code("SMOKER_YES".into());
    let flat = flatten_value(&value, |id| {
      (id == "SMOKER_YES").then(|| "Yes - they smoke".to_owned())
    });
    assert_eq!(flat, "Yes - they smoke");
  }

  #[test]
  fn flatten_passes_plain_text_through() {
    let value = FieldValue::Text("no onions".into());
    assert_eq!(flatten_value(&value, |_| None), "no onions");
  }
}
