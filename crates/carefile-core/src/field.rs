//! The tracked-field model — the closed set of versioned attributes on a
//! health record.
//!
//! Each field declares which typed value slot it occupies, which reference
//! data domain (if any) constrains its coded values, and how to decide whether
//! a proposed value differs from the last recorded one. Change detection is
//! structural: selection lists are compared in a canonical order so that two
//! requests listing the same allergies in a different order are not a change.

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator as _};

use crate::{Error, Result};

// ─── TrackedField ────────────────────────────────────────────────────────────

/// A versioned attribute of the per-prisoner health record.
///
/// The set is closed on purpose: exhaustive matches keep the per-field
/// behaviour checkable by the compiler, and the discriminant doubles as the
/// storage key in the `field_history` and `field_metadata` tables.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  EnumIter,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackedField {
  FoodAllergy,
  MedicalDiet,
  PersonalisedDiet,
  CateringInstructions,
  Smoker,
}

/// Which of the four mutually-exclusive value slots a field occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
  Int,
  Text,
  Code,
  Selections,
}

impl TrackedField {
  /// The discriminant string stored in the `field` column.
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::FoodAllergy => "FOOD_ALLERGY",
      Self::MedicalDiet => "MEDICAL_DIET",
      Self::PersonalisedDiet => "PERSONALISED_DIET",
      Self::CateringInstructions => "CATERING_INSTRUCTIONS",
      Self::Smoker => "SMOKER",
    }
  }

  pub fn from_discriminant(s: &str) -> Result<Self> {
    Self::iter()
      .find(|f| f.discriminant() == s)
      .ok_or_else(|| Error::UnknownField(s.to_owned()))
  }

  /// All tracked fields, in a stable order.
  pub fn all() -> impl Iterator<Item = Self> { Self::iter() }

  pub fn kind(&self) -> ValueKind {
    match self {
      Self::FoodAllergy | Self::MedicalDiet | Self::PersonalisedDiet => {
        ValueKind::Selections
      }
      Self::CateringInstructions => ValueKind::Text,
      Self::Smoker => ValueKind::Code,
    }
  }

  /// The reference data domain constraining this field's coded values.
  /// `None` for free-text fields.
  pub fn domain(&self) -> Option<&'static str> {
    match self {
      Self::FoodAllergy => Some("FOOD_ALLERGY"),
      Self::MedicalDiet => Some("MEDICAL_DIET"),
      Self::PersonalisedDiet => Some("PERSONALISED_DIET"),
      Self::CateringInstructions => None,
      Self::Smoker => Some("SMOKER"),
    }
  }

  /// Human-readable category label used in subject-access exports.
  pub fn label(&self) -> &'static str {
    match self {
      Self::FoodAllergy => "Food allergies",
      Self::MedicalDiet => "Medical diet",
      Self::PersonalisedDiet => "Personalised dietary requirements",
      Self::CateringInstructions => "Catering instructions",
      Self::Smoker => "Smoker or vaper",
    }
  }

  /// Reject a value whose populated slot is not the one this field declares.
  /// Enforced in the write path before any persistence; the typed request
  /// structs make a mismatch unrepresentable over HTTP, so this guards direct
  /// store callers.
  pub fn check_value(&self, value: &FieldValue) -> Result<()> {
    let expected = self.kind();
    let found = value.kind();
    if expected == found {
      Ok(())
    } else {
      Err(Error::ValueKindMismatch {
        field: self.discriminant(),
        expected,
        found,
      })
    }
  }

  /// Structural change detection against the most recent history entry.
  ///
  /// No prior history is always a change — a first write of an empty list is
  /// a recorded state, distinct from "never set". Empty against empty is not
  /// a change.
  pub fn has_changed(
    &self,
    previous: Option<&FieldValue>,
    proposed: &FieldValue,
  ) -> bool {
    match previous {
      None => true,
      Some(p) => !p.matches(proposed),
    }
  }
}

// ─── FieldValue ──────────────────────────────────────────────────────────────

/// One coded selection with an optional free-text comment.
///
/// `value` is a reference data code id; the description is resolved at read
/// time, never stored alongside history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
  pub value:   String,
  pub comment: Option<String>,
}

/// The typed payload of a field — exactly one populated slot.
///
/// The persistence layer spreads this over four nullable columns; the sum
/// type makes the mutual-exclusivity invariant hold in memory too, not only
/// as a database constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
  Int(i64),
  Text(String),
  /// A single reference data code id.
  Code(String),
  /// A set of coded selections with comments.
  Selections(Vec<Selection>),
}

impl FieldValue {
  pub fn kind(&self) -> ValueKind {
    match self {
      Self::Int(_) => ValueKind::Int,
      Self::Text(_) => ValueKind::Text,
      Self::Code(_) => ValueKind::Code,
      Self::Selections(_) => ValueKind::Selections,
    }
  }

  /// The order-independent-but-history-stable form: selections sorted by
  /// code id. Scalars are already canonical.
  pub fn canonical(&self) -> Self {
    match self {
      Self::Selections(items) => {
        let mut sorted = items.clone();
        sorted.sort_by(|a, b| a.value.cmp(&b.value));
        Self::Selections(sorted)
      }
      other => other.clone(),
    }
  }

  /// Structural equality over canonical forms.
  pub fn matches(&self, other: &Self) -> bool {
    self.canonical() == other.canonical()
  }
}
