//! Versioned product data: drafts, published snapshots, and field evidence.
//!
//! A product has at most one draft at a time. Publishing copies the draft into
//! a new, immutable, numbered published row; the draft stays editable. Evidence
//! rows cite the source for one field and belong to exactly one version.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionStatus {
  Draft,
  Published,
}

impl VersionStatus {
  /// The value stored in the `status` column.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Draft => "draft",
      Self::Published => "published",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "draft" => Ok(Self::Draft),
      "published" => Ok(Self::Published),
      other => Err(Error::UnknownStatus(other.to_owned())),
    }
  }
}

// ─── Versions ────────────────────────────────────────────────────────────────

/// One row of product data, draft or published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVersion {
  pub id:         Uuid,
  pub product_id: String,
  pub status:     VersionStatus,
  /// `0` for drafts; `1, 2, 3…` per product for published rows.
  pub version:    u32,
  /// The edited field patch, opaque to the store.
  pub fields:     serde_json::Value,
  /// Score snapshot taken when the draft was saved.
  pub score:      serde_json::Value,
  pub created_by: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

// ─── Evidence ────────────────────────────────────────────────────────────────

/// Where a piece of evidence came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
  WebPage,
  Pdf,
  Manual,
  Other,
}

impl SourceType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::WebPage => "web_page",
      Self::Pdf => "pdf",
      Self::Manual => "manual",
      Self::Other => "other",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "web_page" => Ok(Self::WebPage),
      "pdf" => Ok(Self::Pdf),
      "manual" => Ok(Self::Manual),
      "other" => Ok(Self::Other),
      other => Err(Error::UnknownSourceType(other.to_owned())),
    }
  }
}

/// A citation backing one field of one version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEvidence {
  pub id:           Uuid,
  pub version_id:   Uuid,
  pub field_key:    String,
  pub source_type:  SourceType,
  pub url:          Option<String>,
  pub quoted_text:  Option<String>,
  pub how_gathered: Option<String>,
  pub notes:        Option<String>,
  pub verified_by:  String,
  pub verified_at:  DateTime<Utc>,
  pub is_active:    bool,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

/// Evidence as submitted with a draft save. Ids and timestamps are assigned by
/// the store; `verified_by` defaults to the saving actor and `verified_at` to
/// the save time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvidence {
  pub field_key:    String,
  pub source_type:  SourceType,
  #[serde(default)]
  pub url:          Option<String>,
  #[serde(default)]
  pub quoted_text:  Option<String>,
  #[serde(default)]
  pub how_gathered: Option<String>,
  #[serde(default)]
  pub notes:        Option<String>,
  #[serde(default)]
  pub verified_by:  Option<String>,
  #[serde(default)]
  pub verified_at:  Option<DateTime<Utc>>,
  #[serde(default = "default_active")]
  pub is_active:    bool,
}

fn default_active() -> bool { true }

impl NewEvidence {
  /// Convenience constructor with all optional fields unset.
  pub fn new(field_key: impl Into<String>, source_type: SourceType) -> Self {
    Self {
      field_key: field_key.into(),
      source_type,
      url: None,
      quoted_text: None,
      how_gathered: None,
      notes: None,
      verified_by: None,
      verified_at: None,
      is_active: true,
    }
  }
}

// ─── Inputs and read models ──────────────────────────────────────────────────

/// Input to [`crate::store::VersionStore::save_draft`].
#[derive(Debug, Clone)]
pub struct DraftInput {
  pub product_id: String,
  pub fields:     serde_json::Value,
  pub score:      serde_json::Value,
  pub evidence:   Vec<NewEvidence>,
  pub actor:      String,
}

/// A version together with its evidence rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionWithEvidence {
  pub version:  ProductVersion,
  pub evidence: Vec<FieldEvidence>,
}

/// The result of a successful publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishOutcome {
  pub published_version_id: Uuid,
  pub version:              u32,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_and_source_strings_roundtrip() {
    for s in [VersionStatus::Draft, VersionStatus::Published] {
      assert_eq!(VersionStatus::parse(s.as_str()).unwrap(), s);
      assert_eq!(serde_json::to_value(s).unwrap(), s.as_str());
    }
    for t in [
      SourceType::WebPage,
      SourceType::Pdf,
      SourceType::Manual,
      SourceType::Other,
    ] {
      assert_eq!(SourceType::parse(t.as_str()).unwrap(), t);
      assert_eq!(serde_json::to_value(t).unwrap(), t.as_str());
    }
    assert!(matches!(
      SourceType::parse("tweet"),
      Err(Error::UnknownSourceType(_))
    ));
  }

  #[test]
  fn new_evidence_defaults_when_deserialised() {
    let e: NewEvidence = serde_json::from_str(
      r#"{ "field_key": "bendAngle", "source_type": "web_page" }"#,
    )
    .unwrap();
    assert!(e.is_active);
    assert!(e.url.is_none());
    assert_eq!(e, NewEvidence::new("bendAngle", SourceType::WebPage));
  }
}
