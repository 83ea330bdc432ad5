//! The record service — create-or-update orchestration over any store and
//! directory backend.
//!
//! The service validates prisoner identity and reference codes before any
//! persistence, delegates change tracking to the store's transactional
//! upsert, and projects the aggregate into the response shape that pairs each
//! current value with its last-modified metadata.

use std::{
  collections::{BTreeMap, HashMap},
  sync::Arc,
};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  directory::{PrisonerDirectory, PrisonerSummary},
  field::{FieldValue, Selection, TrackedField},
  history::{AuditContext, FieldMetadata, HealthRecord, SYSTEM_USERNAME},
  refdata::CodeDescriptor,
  sar::{self, SarEntry, SarReport},
  store::RecordStore,
};

// ─── Update requests ─────────────────────────────────────────────────────────

/// A diet-and-allergy update. Absent fields are left untouched — no history
/// row, no metadata change. A present-but-empty list is a real state and is
/// recorded as such.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietAndAllergyUpdate {
  pub food_allergies:        Option<Vec<Selection>>,
  pub medical_diet:          Option<Vec<Selection>>,
  pub personalised_diet:     Option<Vec<Selection>>,
  pub catering_instructions: Option<String>,
}

/// A smoker-status update; touches only the [`TrackedField::Smoker`] field.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmokerUpdate {
  /// A `SMOKER` domain code id, e.g. `SMOKER_VAPER`.
  pub smoker_status: String,
}

// ─── Projection ──────────────────────────────────────────────────────────────

/// A current field value paired with its last-modified pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueWithMetadata<T> {
  pub value:                   T,
  pub last_modified_at:        DateTime<Utc>,
  pub last_modified_by:        String,
  pub last_modified_prison_id: String,
}

/// One coded selection with its code resolved to a descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionView {
  pub value:   CodeDescriptor,
  pub comment: Option<String>,
}

/// The current-state response. A field the prisoner has never had set is
/// entirely absent, not an empty placeholder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietAndAllergyView {
  pub prisoner_number: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub food_allergies: Option<ValueWithMetadata<Vec<SelectionView>>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub medical_diet: Option<ValueWithMetadata<Vec<SelectionView>>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub personalised_diet: Option<ValueWithMetadata<Vec<SelectionView>>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub catering_instructions: Option<ValueWithMetadata<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub smoker_status: Option<ValueWithMetadata<CodeDescriptor>>,
}

// ─── Service ─────────────────────────────────────────────────────────────────

pub struct RecordService<S, D> {
  store:     Arc<S>,
  directory: Arc<D>,
}

impl<S, D> RecordService<S, D>
where
  S: RecordStore,
  D: PrisonerDirectory,
{
  pub fn new(store: Arc<S>, directory: Arc<D>) -> Self {
    Self { store, directory }
  }

  /// Direct store access for read-only surfaces (reference data endpoints).
  pub fn store(&self) -> &Arc<S> { &self.store }

  // ── Writes ────────────────────────────────────────────────────────────

  /// Create-or-update the prisoner's diet and allergy fields, considering
  /// exactly the fields present in `update`.
  pub async fn update_diet_and_allergy(
    &self,
    prisoner_number: &str,
    update: DietAndAllergyUpdate,
    username: &str,
  ) -> Result<DietAndAllergyView> {
    let summary = self.resolve_prisoner(prisoner_number).await?;

    let mut values = BTreeMap::new();
    if let Some(items) = update.food_allergies {
      self
        .validate_selections(TrackedField::FoodAllergy, &items)
        .await?;
      values.insert(TrackedField::FoodAllergy, FieldValue::Selections(items));
    }
    if let Some(items) = update.medical_diet {
      self
        .validate_selections(TrackedField::MedicalDiet, &items)
        .await?;
      values.insert(TrackedField::MedicalDiet, FieldValue::Selections(items));
    }
    if let Some(items) = update.personalised_diet {
      self
        .validate_selections(TrackedField::PersonalisedDiet, &items)
        .await?;
      values
        .insert(TrackedField::PersonalisedDiet, FieldValue::Selections(items));
    }
    if let Some(text) = update.catering_instructions {
      values.insert(TrackedField::CateringInstructions, FieldValue::Text(text));
    }

    self
      .apply(prisoner_number, values, username, &summary)
      .await?;
    self.get_diet_and_allergy(prisoner_number).await
  }

  /// Update smoker status only. Other fields' history and metadata are left
  /// untouched.
  pub async fn update_smoker(
    &self,
    prisoner_number: &str,
    update: SmokerUpdate,
    username: &str,
  ) -> Result<DietAndAllergyView> {
    let summary = self.resolve_prisoner(prisoner_number).await?;
    self
      .validate_code(TrackedField::Smoker, &update.smoker_status)
      .await?;

    let mut values = BTreeMap::new();
    values
      .insert(TrackedField::Smoker, FieldValue::Code(update.smoker_status));

    self
      .apply(prisoner_number, values, username, &summary)
      .await?;
    self.get_diet_and_allergy(prisoner_number).await
  }

  /// Inbound-event write path: confirm the prisoner still resolves in the
  /// directory, then re-run the update flow with no fields under the system
  /// actor. Location is stamped per history row and metadata upsert, never on
  /// the aggregate envelope, so a successful refresh writes no history and no
  /// metadata; the new prison id takes effect from the next field change.
  /// An idempotent no-op when no record exists yet. Returns whether a record
  /// was present.
  pub async fn refresh_location(&self, prisoner_number: &str) -> Result<bool> {
    let existing = self
      .store
      .get_record(prisoner_number)
      .await
      .map_err(box_store)?;
    if existing.is_none() {
      return Ok(false);
    }

    let summary = self.resolve_prisoner(prisoner_number).await?;
    self
      .apply(prisoner_number, BTreeMap::new(), SYSTEM_USERNAME, &summary)
      .await?;
    Ok(true)
  }

  async fn apply(
    &self,
    prisoner_number: &str,
    values: BTreeMap<TrackedField, FieldValue>,
    username: &str,
    summary: &PrisonerSummary,
  ) -> Result<Vec<TrackedField>> {
    let audit = AuditContext {
      at:        Utc::now(),
      by:        username.to_owned(),
      prison_id: summary.prison_id.clone(),
    };
    self
      .store
      .upsert_record(prisoner_number, values, audit)
      .await
      .map_err(box_store)
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  pub async fn get_diet_and_allergy(
    &self,
    prisoner_number: &str,
  ) -> Result<DietAndAllergyView> {
    let record = self
      .store
      .get_record(prisoner_number)
      .await
      .map_err(box_store)?
      .ok_or_else(|| Error::RecordNotFound(prisoner_number.to_owned()))?;
    self.project(record).await
  }

  /// Subject-access export for `[from_date, to_date]`, defaulting to the full
  /// recorded range. `None` means no data at all — the caller maps that to an
  /// empty-response status, not an error.
  pub async fn subject_access_export(
    &self,
    prisoner_number: &str,
    from_date: Option<NaiveDate>,
    to_date: Option<NaiveDate>,
  ) -> Result<Option<SarReport>> {
    let window = sar::export_window(from_date, to_date);

    let in_window = self
      .store
      .history_between(prisoner_number, window.start, window.until)
      .await
      .map_err(box_store)?;

    // Last-known-value fallback for fields with zero in-window activity.
    let mut fallbacks = Vec::new();
    for field in TrackedField::all() {
      if in_window.iter().any(|h| h.field == field) {
        continue;
      }
      if let Some(entry) = self
        .store
        .latest_history_before(prisoner_number, field, window.start)
        .await
        .map_err(box_store)?
      {
        fallbacks.push(entry);
      }
    }

    let merged = sar::merge_descending(in_window, fallbacks);
    if merged.is_empty() {
      return Ok(None);
    }

    // Resolve every embedded code id once; unresolvable ids degrade to the
    // placeholder during flattening.
    let mut descriptions: HashMap<String, String> = HashMap::new();
    for entry in &merged {
      for id in sar::code_ids(&entry.value) {
        if descriptions.contains_key(id) {
          continue;
        }
        if let Some(code) = self.store.get_code(id).await.map_err(box_store)? {
          descriptions.insert(id.to_owned(), code.description);
        }
      }
    }

    let content = merged
      .iter()
      .map(|h| SarEntry {
        field:            h.field.label().to_owned(),
        value:            sar::flatten_value(&h.value, |id| {
          descriptions.get(id).cloned()
        }),
        last_modified_at: h.created_at,
        last_modified_by: h.created_by.clone(),
        prison_id:        h.created_in_prison.clone(),
      })
      .collect();

    Ok(Some(SarReport {
      prisoner_number: prisoner_number.to_owned(),
      from_date: window.from_date,
      to_date: window.to_date,
      content,
    }))
  }

  // ── Validation ────────────────────────────────────────────────────────

  async fn resolve_prisoner(
    &self,
    prisoner_number: &str,
  ) -> Result<PrisonerSummary> {
    self
      .directory
      .lookup(prisoner_number)
      .await
      .map_err(|e| Error::Directory(Box::new(e)))?
      .ok_or_else(|| Error::PrisonerNotFound(prisoner_number.to_owned()))
  }

  async fn validate_selections(
    &self,
    field: TrackedField,
    items: &[Selection],
  ) -> Result<()> {
    for item in items {
      self.validate_code(field, &item.value).await?;
    }
    Ok(())
  }

  /// A coded value must exist in the catalog and belong to the field's
  /// declared domain.
  async fn validate_code(&self, field: TrackedField, id: &str) -> Result<()> {
    let Some(domain) = field.domain() else {
      return Ok(());
    };
    match self.store.get_code(id).await.map_err(box_store)? {
      Some(code) if code.domain == domain => Ok(()),
      _ => Err(Error::InvalidReferenceCode {
        field: field.discriminant(),
        id:    id.to_owned(),
      }),
    }
  }

  // ── Projection ────────────────────────────────────────────────────────

  async fn project(&self, record: HealthRecord) -> Result<DietAndAllergyView> {
    let mut view = DietAndAllergyView {
      prisoner_number:       record.prisoner_number.clone(),
      food_allergies:        None,
      medical_diet:          None,
      personalised_diet:     None,
      catering_instructions: None,
      smoker_status:         None,
    };

    for (field, meta) in &record.metadata {
      let Some(value) = record.values.get(field) else {
        continue;
      };
      match (field, value) {
        (TrackedField::FoodAllergy, FieldValue::Selections(items)) => {
          view.food_allergies =
            Some(with_metadata(meta, self.selection_views(items).await?));
        }
        (TrackedField::MedicalDiet, FieldValue::Selections(items)) => {
          view.medical_diet =
            Some(with_metadata(meta, self.selection_views(items).await?));
        }
        (TrackedField::PersonalisedDiet, FieldValue::Selections(items)) => {
          view.personalised_diet =
            Some(with_metadata(meta, self.selection_views(items).await?));
        }
        (TrackedField::CateringInstructions, FieldValue::Text(text)) => {
          view.catering_instructions = Some(with_metadata(meta, text.clone()));
        }
        (TrackedField::Smoker, FieldValue::Code(id)) => {
          view.smoker_status =
            Some(with_metadata(meta, self.descriptor(id).await?));
        }
        // A slot mismatch cannot be produced by the write path.
        _ => {}
      }
    }

    Ok(view)
  }

  async fn selection_views(
    &self,
    items: &[Selection],
  ) -> Result<Vec<SelectionView>> {
    let mut views = Vec::with_capacity(items.len());
    for item in items {
      views.push(SelectionView {
        value:   self.descriptor(&item.value).await?,
        comment: item.comment.clone(),
      });
    }
    Ok(views)
  }

  /// Resolve a code id for display. A code deleted since the value was
  /// written degrades to the placeholder description rather than failing the
  /// whole read.
  async fn descriptor(&self, id: &str) -> Result<CodeDescriptor> {
    match self.store.get_code(id).await.map_err(box_store)? {
      Some(code) => Ok(CodeDescriptor::from(&code)),
      None => Ok(CodeDescriptor {
        id:          id.to_owned(),
        code:        id.to_owned(),
        description: sar::UNKNOWN_VALUE.to_owned(),
      }),
    }
  }
}

fn box_store<E>(e: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  Error::Store(Box::new(e))
}

fn with_metadata<T>(meta: &FieldMetadata, value: T) -> ValueWithMetadata<T> {
  ValueWithMetadata {
    value,
    last_modified_at: meta.last_modified_at,
    last_modified_by: meta.last_modified_by.clone(),
    last_modified_prison_id: meta.last_modified_prison.clone(),
  }
}
