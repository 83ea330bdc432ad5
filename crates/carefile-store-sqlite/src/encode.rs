//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Selection lists are stored
//! as compact JSON in the `value_json` slot; scalar values live in their own
//! typed columns. Exactly one slot is populated per row — the decoder rejects
//! anything else so the invariant holds in in-memory tests too, not only via
//! the CHECK constraint.

use carefile_core::{
  field::{FieldValue, Selection, TrackedField},
  history::{FieldHistory, FieldMetadata},
  refdata::{ReferenceDataCode, ReferenceDataDomain},
};
use chrono::{DateTime, Utc};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn decode_dt_opt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

// ─── TrackedField ────────────────────────────────────────────────────────────

pub fn decode_field(s: &str) -> Result<TrackedField> {
  Ok(TrackedField::from_discriminant(s)?)
}

// ─── Value slots ─────────────────────────────────────────────────────────────

/// A field value spread over the four mutually-exclusive columns.
#[derive(Debug, Clone, Default)]
pub struct ValueColumns {
  pub int:  Option<i64>,
  pub text: Option<String>,
  pub code: Option<String>,
  pub json: Option<String>,
}

pub fn encode_value(value: &FieldValue) -> Result<ValueColumns> {
  let mut cols = ValueColumns::default();
  match value {
    FieldValue::Int(n) => cols.int = Some(*n),
    FieldValue::Text(t) => cols.text = Some(t.clone()),
    FieldValue::Code(id) => cols.code = Some(id.clone()),
    FieldValue::Selections(items) => {
      cols.json = Some(serde_json::to_string(items)?);
    }
  }
  Ok(cols)
}

pub fn decode_value(field: &str, cols: ValueColumns) -> Result<FieldValue> {
  let populated = usize::from(cols.int.is_some())
    + usize::from(cols.text.is_some())
    + usize::from(cols.code.is_some())
    + usize::from(cols.json.is_some());
  if populated != 1 {
    return Err(Error::ValueSlots { field: field.to_owned(), populated });
  }

  if let Some(n) = cols.int {
    return Ok(FieldValue::Int(n));
  }
  if let Some(t) = cols.text {
    return Ok(FieldValue::Text(t));
  }
  if let Some(id) = cols.code {
    return Ok(FieldValue::Code(id));
  }
  // populated == 1, so json must be the remaining slot.
  let json = cols.json.unwrap_or_default();
  let items: Vec<Selection> = serde_json::from_str(&json)?;
  Ok(FieldValue::Selections(items))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `field_history` row.
pub struct RawFieldHistory {
  pub history_id:        i64,
  pub prisoner_number:   String,
  pub field:             String,
  pub value_int:         Option<i64>,
  pub value_text:        Option<String>,
  pub value_code:        Option<String>,
  pub value_json:        Option<String>,
  pub created_at:        String,
  pub created_by:        String,
  pub created_in_prison: String,
  pub merged_at:         Option<String>,
  pub merged_from:       Option<String>,
}

impl RawFieldHistory {
  pub fn into_history(self) -> Result<FieldHistory> {
    let value = decode_value(&self.field, ValueColumns {
      int:  self.value_int,
      text: self.value_text,
      code: self.value_code,
      json: self.value_json,
    })?;

    Ok(FieldHistory {
      history_id: self.history_id,
      prisoner_number: self.prisoner_number,
      field: decode_field(&self.field)?,
      value,
      created_at: decode_dt(&self.created_at)?,
      created_by: self.created_by,
      created_in_prison: self.created_in_prison,
      merged_at: decode_dt_opt(self.merged_at.as_deref())?,
      merged_from: self.merged_from,
    })
  }
}

/// Raw strings read directly from a `field_value` row.
pub struct RawFieldValue {
  pub field:      String,
  pub value_int:  Option<i64>,
  pub value_text: Option<String>,
  pub value_code: Option<String>,
  pub value_json: Option<String>,
}

impl RawFieldValue {
  pub fn into_parts(self) -> Result<(TrackedField, FieldValue)> {
    let value = decode_value(&self.field, ValueColumns {
      int:  self.value_int,
      text: self.value_text,
      code: self.value_code,
      json: self.value_json,
    })?;
    Ok((decode_field(&self.field)?, value))
  }
}

/// Raw strings read directly from a `field_metadata` row.
pub struct RawFieldMetadata {
  pub field:                String,
  pub last_modified_at:     String,
  pub last_modified_by:     String,
  pub last_modified_prison: String,
}

impl RawFieldMetadata {
  pub fn into_metadata(self) -> Result<FieldMetadata> {
    Ok(FieldMetadata {
      field:                decode_field(&self.field)?,
      last_modified_at:     decode_dt(&self.last_modified_at)?,
      last_modified_by:     self.last_modified_by,
      last_modified_prison: self.last_modified_prison,
    })
  }
}

/// Raw strings read directly from a `reference_data_code` row.
pub struct RawCode {
  pub id:             String,
  pub domain:         String,
  pub code:           String,
  pub description:    String,
  pub list_sequence:  i64,
  pub created_at:     String,
  pub created_by:     String,
  pub deactivated_at: Option<String>,
  pub deactivated_by: Option<String>,
}

impl RawCode {
  pub fn into_code(self) -> Result<ReferenceDataCode> {
    Ok(ReferenceDataCode {
      id: self.id,
      domain: self.domain,
      code: self.code,
      description: self.description,
      list_sequence: self.list_sequence,
      created_at: decode_dt(&self.created_at)?,
      created_by: self.created_by,
      deactivated_at: decode_dt_opt(self.deactivated_at.as_deref())?,
      deactivated_by: self.deactivated_by,
    })
  }
}

/// Raw strings read directly from a `reference_data_domain` row.
pub struct RawDomain {
  pub code:           String,
  pub description:    String,
  pub list_sequence:  i64,
  pub created_at:     String,
  pub created_by:     String,
  pub deactivated_at: Option<String>,
  pub deactivated_by: Option<String>,
}

impl RawDomain {
  pub fn into_domain(
    self,
    codes: Vec<ReferenceDataCode>,
  ) -> Result<ReferenceDataDomain> {
    Ok(ReferenceDataDomain {
      code: self.code,
      description: self.description,
      list_sequence: self.list_sequence,
      created_at: decode_dt(&self.created_at)?,
      created_by: self.created_by,
      deactivated_at: decode_dt_opt(self.deactivated_at.as_deref())?,
      deactivated_by: self.deactivated_by,
      codes,
    })
  }
}
