//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Field and score snapshots are
//! stored as compact JSON. UUIDs are stored as hyphenated lowercase strings.

use bendscore_core::version::{
  FieldEvidence, NewEvidence, ProductVersion, SourceType, VersionStatus,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Column lists ────────────────────────────────────────────────────────────

pub const VERSION_COLUMNS: &str = "id, product_id, status, version, \
  fields_json, score_json, created_by, created_at, updated_at";

pub const EVIDENCE_COLUMNS: &str = "id, version_id, field_key, source_type, \
  url, quoted_text, how_gathered, notes, verified_by, verified_at, is_active, \
  created_at, updated_at";

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `product_versions` row, in
/// [`VERSION_COLUMNS`] order.
#[derive(Debug, Clone)]
pub struct RawVersion {
  pub id:          String,
  pub product_id:  String,
  pub status:      String,
  pub version:     i64,
  pub fields_json: String,
  pub score_json:  String,
  pub created_by:  String,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawVersion {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      product_id:  row.get(1)?,
      status:      row.get(2)?,
      version:     row.get(3)?,
      fields_json: row.get(4)?,
      score_json:  row.get(5)?,
      created_by:  row.get(6)?,
      created_at:  row.get(7)?,
      updated_at:  row.get(8)?,
    })
  }

  pub fn into_version(self) -> Result<ProductVersion> {
    Ok(ProductVersion {
      id:         decode_uuid(&self.id)?,
      product_id: self.product_id,
      status:     VersionStatus::parse(&self.status)?,
      version:    u32::try_from(self.version).map_err(|_| {
        Error::InvalidColumn(format!("version {} out of range", self.version))
      })?,
      fields:     serde_json::from_str(&self.fields_json)?,
      score:      serde_json::from_str(&self.score_json)?,
      created_by: self.created_by,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `product_field_evidence` row, in
/// [`EVIDENCE_COLUMNS`] order.
#[derive(Debug, Clone)]
pub struct RawEvidence {
  pub id:           String,
  pub version_id:   String,
  pub field_key:    String,
  pub source_type:  String,
  pub url:          Option<String>,
  pub quoted_text:  Option<String>,
  pub how_gathered: Option<String>,
  pub notes:        Option<String>,
  pub verified_by:  String,
  pub verified_at:  String,
  pub is_active:    bool,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawEvidence {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      version_id:   row.get(1)?,
      field_key:    row.get(2)?,
      source_type:  row.get(3)?,
      url:          row.get(4)?,
      quoted_text:  row.get(5)?,
      how_gathered: row.get(6)?,
      notes:        row.get(7)?,
      verified_by:  row.get(8)?,
      verified_at:  row.get(9)?,
      is_active:    row.get(10)?,
      created_at:   row.get(11)?,
      updated_at:   row.get(12)?,
    })
  }

  /// Build a fresh row for `version_id` from submitted evidence.
  pub fn from_new(
    input: NewEvidence,
    version_id: Uuid,
    actor: &str,
    now: DateTime<Utc>,
  ) -> Self {
    let now_str = encode_dt(now);
    Self {
      id:           encode_uuid(Uuid::new_v4()),
      version_id:   encode_uuid(version_id),
      field_key:    input.field_key,
      source_type:  input.source_type.as_str().to_owned(),
      url:          input.url,
      quoted_text:  input.quoted_text,
      how_gathered: input.how_gathered,
      notes:        input.notes,
      verified_by:  input.verified_by.unwrap_or_else(|| actor.to_owned()),
      verified_at:  input.verified_at.map(encode_dt).unwrap_or_else(|| now_str.clone()),
      is_active:    input.is_active,
      created_at:   now_str.clone(),
      updated_at:   now_str,
    }
  }

  /// A copy of this row attached to another version, with a new id and fresh
  /// timestamps. Verification metadata is carried over unchanged.
  pub fn copied_to(&self, version_id: &str, now: &str) -> Self {
    Self {
      id: encode_uuid(Uuid::new_v4()),
      version_id: version_id.to_owned(),
      created_at: now.to_owned(),
      updated_at: now.to_owned(),
      ..self.clone()
    }
  }

  pub fn insert(&self, conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute(
      &format!(
        "INSERT INTO product_field_evidence ({EVIDENCE_COLUMNS})
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
      ),
      rusqlite::params![
        self.id,
        self.version_id,
        self.field_key,
        self.source_type,
        self.url,
        self.quoted_text,
        self.how_gathered,
        self.notes,
        self.verified_by,
        self.verified_at,
        self.is_active,
        self.created_at,
        self.updated_at,
      ],
    )?;
    Ok(())
  }

  pub fn into_evidence(self) -> Result<FieldEvidence> {
    Ok(FieldEvidence {
      id:           decode_uuid(&self.id)?,
      version_id:   decode_uuid(&self.version_id)?,
      field_key:    self.field_key,
      source_type:  SourceType::parse(&self.source_type)?,
      url:          self.url,
      quoted_text:  self.quoted_text,
      how_gathered: self.how_gathered,
      notes:        self.notes,
      verified_by:  self.verified_by,
      verified_at:  decode_dt(&self.verified_at)?,
      is_active:    self.is_active,
      created_at:   decode_dt(&self.created_at)?,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}
