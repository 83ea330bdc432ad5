//! [`SqliteStore`] — the SQLite implementation of [`RecordStore`].

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;

use carefile_core::{
  field::{FieldValue, TrackedField},
  history::{AuditContext, FieldHistory, HealthRecord},
  refdata::{ReferenceDataCode, ReferenceDataDomain},
  store::RecordStore,
};

use crate::{
  Error, Result,
  encode::{
    RawCode, RawDomain, RawFieldHistory, RawFieldMetadata, RawFieldValue,
    ValueColumns, decode_value, encode_dt, encode_value,
  },
  schema::SCHEMA,
  seed::SEED,
};

/// Convert a domain-level decode failure into the closure error type used by
/// [`tokio_rusqlite::Connection::call`], so it aborts the transaction.
fn abort(e: Error) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(e))
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Carefile record store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Writes are
/// serialized by the single connection, which together with the per-call
/// transaction gives readers an all-or-nothing view of every upsert.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path`, run schema initialisation and the
  /// reference data seed.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        conn.execute_batch(SEED)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Raw access for tests and maintenance tooling.
  #[cfg(test)]
  pub(crate) async fn raw_batch(&self, sql: &str) -> Result<()> {
    let sql = sql.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row readers ─────────────────────────────────────────────────────────────

fn read_history_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawFieldHistory> {
  Ok(RawFieldHistory {
    history_id:        row.get(0)?,
    prisoner_number:   row.get(1)?,
    field:             row.get(2)?,
    value_int:         row.get(3)?,
    value_text:        row.get(4)?,
    value_code:        row.get(5)?,
    value_json:        row.get(6)?,
    created_at:        row.get(7)?,
    created_by:        row.get(8)?,
    created_in_prison: row.get(9)?,
    merged_at:         row.get(10)?,
    merged_from:       row.get(11)?,
  })
}

const HISTORY_COLUMNS: &str = "history_id, prisoner_number, field, value_int, \
   value_text, value_code, value_json, created_at, created_by, \
   created_in_prison, merged_at, merged_from";

fn read_code_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawCode> {
  Ok(RawCode {
    id:             row.get(0)?,
    domain:         row.get(1)?,
    code:           row.get(2)?,
    description:    row.get(3)?,
    list_sequence:  row.get(4)?,
    created_at:     row.get(5)?,
    created_by:     row.get(6)?,
    deactivated_at: row.get(7)?,
    deactivated_by: row.get(8)?,
  })
}

const CODE_COLUMNS: &str = "id, domain, code, description, list_sequence, \
   created_at, created_by, deactivated_at, deactivated_by";

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  // ── Aggregate writes ──────────────────────────────────────────────────

  async fn upsert_record(
    &self,
    prisoner_number: &str,
    values: BTreeMap<TrackedField, FieldValue>,
    audit: AuditContext,
  ) -> Result<Vec<TrackedField>> {
    let pn = prisoner_number.to_owned();
    let at_str = encode_dt(audit.at);
    let by = audit.by;
    let prison = audit.prison_id;

    let changed: Vec<TrackedField> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Aggregate created lazily on first write, never on read.
        tx.execute(
          "INSERT OR IGNORE INTO health_record (prisoner_number, created_at)
           VALUES (?1, ?2)",
          rusqlite::params![pn, at_str],
        )?;

        let mut changed = Vec::new();

        for (field, value) in values {
          let field_str = field.discriminant();

          // The payload must occupy the field's declared slot; the CHECK
          // constraint only enforces that exactly one slot is populated.
          field
            .check_value(&value)
            .map_err(|e| abort(Error::Core(e)))?;

          // Most recent history entry for (prisoner, field), if any.
          let prev_cols: Option<ValueColumns> = tx
            .query_row(
              "SELECT value_int, value_text, value_code, value_json
               FROM field_history
               WHERE prisoner_number = ?1 AND field = ?2
               ORDER BY created_at DESC, history_id DESC
               LIMIT 1",
              rusqlite::params![pn, field_str],
              |row| {
                Ok(ValueColumns {
                  int:  row.get(0)?,
                  text: row.get(1)?,
                  code: row.get(2)?,
                  json: row.get(3)?,
                })
              },
            )
            .optional()?;

          let previous = prev_cols
            .map(|cols| decode_value(field_str, cols))
            .transpose()
            .map_err(abort)?;

          // History snapshots are stored in canonical form so selection order
          // never shows up as a change.
          let proposed = value.canonical();
          if !field.has_changed(previous.as_ref(), &proposed) {
            continue;
          }

          let cols = encode_value(&proposed).map_err(abort)?;

          tx.execute(
            "INSERT INTO field_history
               (prisoner_number, field, value_int, value_text, value_code,
                value_json, created_at, created_by, created_in_prison)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
              pn, field_str, cols.int, cols.text, cols.code, cols.json,
              at_str, by, prison,
            ],
          )?;

          tx.execute(
            "INSERT INTO field_metadata
               (prisoner_number, field, last_modified_at, last_modified_by,
                last_modified_prison)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (prisoner_number, field) DO UPDATE SET
               last_modified_at     = excluded.last_modified_at,
               last_modified_by     = excluded.last_modified_by,
               last_modified_prison = excluded.last_modified_prison",
            rusqlite::params![pn, field_str, at_str, by, prison],
          )?;

          // Clear-and-replace the live value.
          tx.execute(
            "INSERT INTO field_value
               (prisoner_number, field, value_int, value_text, value_code,
                value_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (prisoner_number, field) DO UPDATE SET
               value_int  = excluded.value_int,
               value_text = excluded.value_text,
               value_code = excluded.value_code,
               value_json = excluded.value_json",
            rusqlite::params![
              pn, field_str, cols.int, cols.text, cols.code, cols.json,
            ],
          )?;

          changed.push(field);
        }

        tx.commit()?;
        Ok(changed)
      })
      .await?;

    if !changed.is_empty() {
      tracing::debug!(
        prisoner_number,
        fields = ?changed,
        "recorded field changes"
      );
    }
    Ok(changed)
  }

  // ── Aggregate reads ───────────────────────────────────────────────────

  async fn get_record(
    &self,
    prisoner_number: &str,
  ) -> Result<Option<HealthRecord>> {
    let pn = prisoner_number.to_owned();

    type RawRecord =
      (Option<String>, Vec<RawFieldValue>, Vec<RawFieldMetadata>);

    let (created_at, raw_values, raw_metadata): RawRecord = self
      .conn
      .call(move |conn| {
        let created_at: Option<String> = conn
          .query_row(
            "SELECT created_at FROM health_record WHERE prisoner_number = ?1",
            rusqlite::params![pn],
            |row| row.get(0),
          )
          .optional()?;

        if created_at.is_none() {
          return Ok((None, Vec::new(), Vec::new()));
        }

        let mut stmt = conn.prepare(
          "SELECT field, value_int, value_text, value_code, value_json
           FROM field_value WHERE prisoner_number = ?1",
        )?;
        let values = stmt
          .query_map(rusqlite::params![pn], |row| {
            Ok(RawFieldValue {
              field:      row.get(0)?,
              value_int:  row.get(1)?,
              value_text: row.get(2)?,
              value_code: row.get(3)?,
              value_json: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(
          "SELECT field, last_modified_at, last_modified_by,
                  last_modified_prison
           FROM field_metadata WHERE prisoner_number = ?1",
        )?;
        let metadata = stmt
          .query_map(rusqlite::params![pn], |row| {
            Ok(RawFieldMetadata {
              field:                row.get(0)?,
              last_modified_at:     row.get(1)?,
              last_modified_by:     row.get(2)?,
              last_modified_prison: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((created_at, values, metadata))
      })
      .await?;

    let Some(created_at) = created_at else {
      return Ok(None);
    };

    let mut values = BTreeMap::new();
    for raw in raw_values {
      let (field, value) = raw.into_parts()?;
      values.insert(field, value);
    }

    let mut metadata = BTreeMap::new();
    for raw in raw_metadata {
      let meta = raw.into_metadata()?;
      metadata.insert(meta.field, meta);
    }

    Ok(Some(HealthRecord {
      prisoner_number: prisoner_number.to_owned(),
      created_at: crate::encode::decode_dt(&created_at)?,
      values,
      metadata,
    }))
  }

  // ── History queries ───────────────────────────────────────────────────

  async fn history_between(
    &self,
    prisoner_number: &str,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
  ) -> Result<Vec<FieldHistory>> {
    let pn = prisoner_number.to_owned();
    let from_str = encode_dt(from);
    let until_str = encode_dt(until);

    let raws: Vec<RawFieldHistory> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {HISTORY_COLUMNS}
           FROM field_history
           WHERE prisoner_number = ?1
             AND created_at >= ?2
             AND created_at < ?3
           ORDER BY history_id DESC"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![pn, from_str, until_str],
            read_history_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFieldHistory::into_history).collect()
  }

  async fn latest_history_before(
    &self,
    prisoner_number: &str,
    field: TrackedField,
    before: DateTime<Utc>,
  ) -> Result<Option<FieldHistory>> {
    let pn = prisoner_number.to_owned();
    let field_str = field.discriminant();
    let before_str = encode_dt(before);

    let raw: Option<RawFieldHistory> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {HISTORY_COLUMNS}
                 FROM field_history
                 WHERE prisoner_number = ?1
                   AND field = ?2
                   AND created_at < ?3
                 ORDER BY created_at DESC, history_id DESC
                 LIMIT 1"
              ),
              rusqlite::params![pn, field_str, before_str],
              read_history_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawFieldHistory::into_history).transpose()
  }

  // ── Reference data ────────────────────────────────────────────────────

  async fn list_domains(
    &self,
    include_inactive: bool,
  ) -> Result<Vec<ReferenceDataDomain>> {
    type RawCatalog = (Vec<RawDomain>, Vec<RawCode>);

    let (raw_domains, raw_codes): RawCatalog = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT code, description, list_sequence, created_at, created_by,
                  deactivated_at, deactivated_by
           FROM reference_data_domain
           ORDER BY list_sequence, code",
        )?;
        let domains = stmt
          .query_map([], |row| {
            Ok(RawDomain {
              code:           row.get(0)?,
              description:    row.get(1)?,
              list_sequence:  row.get(2)?,
              created_at:     row.get(3)?,
              created_by:     row.get(4)?,
              deactivated_at: row.get(5)?,
              deactivated_by: row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {CODE_COLUMNS}
           FROM reference_data_code
           ORDER BY list_sequence, code"
        ))?;
        let codes = stmt
          .query_map([], read_code_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((domains, codes))
      })
      .await?;

    let codes = raw_codes
      .into_iter()
      .map(RawCode::into_code)
      .collect::<Result<Vec<_>>>()?;

    let mut domains = Vec::with_capacity(raw_domains.len());
    for raw in raw_domains {
      let domain_codes = codes
        .iter()
        .filter(|c| c.domain == raw.code)
        .cloned()
        .collect();
      domains.push(raw.into_domain(domain_codes)?);
    }

    if !include_inactive {
      domains.retain(ReferenceDataDomain::is_active);
    }
    Ok(domains)
  }

  async fn get_domain(
    &self,
    code: &str,
  ) -> Result<Option<ReferenceDataDomain>> {
    // Small catalog; reuse the full listing rather than a bespoke query.
    let domains = self.list_domains(true).await?;
    Ok(domains.into_iter().find(|d| d.code == code))
  }

  async fn get_code(&self, id: &str) -> Result<Option<ReferenceDataCode>> {
    let id = id.to_owned();

    let raw: Option<RawCode> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {CODE_COLUMNS} FROM reference_data_code WHERE id = ?1"
              ),
              rusqlite::params![id],
              read_code_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCode::into_code).transpose()
  }

  async fn list_active_codes(
    &self,
    domain: &str,
  ) -> Result<Vec<ReferenceDataCode>> {
    let domain = domain.to_owned();
    let now_str = encode_dt(Utc::now());

    let raws: Vec<RawCode> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CODE_COLUMNS}
           FROM reference_data_code
           WHERE domain = ?1
             AND (deactivated_at IS NULL OR deactivated_at > ?2)
           ORDER BY list_sequence, description"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![domain, now_str], read_code_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCode::into_code).collect()
  }
}
