//! [`SqliteStore`], the SQLite implementation of [`VersionStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use bendscore_core::{
  store::VersionStore,
  version::{DraftInput, ProductVersion, PublishOutcome, VersionWithEvidence},
};

use crate::{
  encode::{
    encode_dt, encode_uuid, RawEvidence, RawVersion, EVIDENCE_COLUMNS,
    VERSION_COLUMNS,
  },
  schema::SCHEMA,
  Error, Result,
};

/// How many times publish re-reads the next version number after losing a
/// race on the `(product_id, version)` unique index.
const PUBLISH_ATTEMPTS: usize = 3;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A product version store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
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
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Load one version row matching `status` (and `version`, when given) plus
  /// its evidence, preferring the highest version number.
  async fn load_with_evidence(
    &self,
    product_id: &str,
    status: &'static str,
    version: Option<u32>,
  ) -> Result<Option<VersionWithEvidence>> {
    let product_id = product_id.to_owned();
    let version = version.map(i64::from);

    let raw: Option<(RawVersion, Vec<RawEvidence>)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let row = tx
          .query_row(
            &format!(
              "SELECT {VERSION_COLUMNS} FROM product_versions
               WHERE product_id = ?1 AND status = ?2
                 AND (?3 IS NULL OR version = ?3)
               ORDER BY version DESC LIMIT 1"
            ),
            rusqlite::params![product_id, status, version],
            RawVersion::from_row,
          )
          .optional()?;

        let Some(row) = row else {
          return Ok(None);
        };

        let evidence = select_evidence(&tx, &row.id)?;
        tx.commit()?;
        Ok(Some((row, evidence)))
      })
      .await?;

    raw
      .map(|(version, evidence)| {
        Ok(VersionWithEvidence {
          version:  version.into_version()?,
          evidence: evidence
            .into_iter()
            .map(RawEvidence::into_evidence)
            .collect::<Result<Vec<_>>>()?,
        })
      })
      .transpose()
  }

  /// One publish attempt. `Ok(None)` means the product has no draft.
  async fn try_publish(
    &self,
    product_id: &str,
    actor: &str,
  ) -> std::result::Result<Option<PublishOutcome>, tokio_rusqlite::Error> {
    let product_id = product_id.to_owned();
    let actor = actor.to_owned();
    let new_id = Uuid::new_v4();
    let new_id_str = encode_uuid(new_id);
    let now = encode_dt(Utc::now());

    let version: Option<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let draft: Option<(String, String, String)> = tx
          .query_row(
            "SELECT id, fields_json, score_json FROM product_versions
             WHERE product_id = ?1 AND status = 'draft'",
            rusqlite::params![product_id],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
          )
          .optional()?;

        let Some((draft_id, fields_json, score_json)) = draft else {
          return Ok(None);
        };

        let next: i64 = tx.query_row(
          "SELECT COALESCE(MAX(version), 0) + 1 FROM product_versions
           WHERE product_id = ?1 AND status = 'published'",
          rusqlite::params![product_id],
          |r| r.get(0),
        )?;

        tx.execute(
          &format!(
            "INSERT INTO product_versions ({VERSION_COLUMNS})
             VALUES (?1, ?2, 'published', ?3, ?4, ?5, ?6, ?7, ?7)"
          ),
          rusqlite::params![
            new_id_str,
            product_id,
            next,
            fields_json,
            score_json,
            actor,
            now,
          ],
        )?;

        let evidence = select_evidence(&tx, &draft_id)?;
        for row in evidence.iter().filter(|e| e.is_active) {
          row.copied_to(&new_id_str, &now).insert(&tx)?;
        }

        tx.commit()?;
        Ok(Some(next))
      })
      .await?;

    version
      .map(|v| {
        let version = u32::try_from(v).map_err(|_| {
          tokio_rusqlite::Error::Other(
            format!("version {v} out of range").into(),
          )
        })?;
        Ok(PublishOutcome { published_version_id: new_id, version })
      })
      .transpose()
  }
}

/// Every evidence row attached to `version_id`, in insertion order.
fn select_evidence(
  conn: &rusqlite::Connection,
  version_id: &str,
) -> rusqlite::Result<Vec<RawEvidence>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {EVIDENCE_COLUMNS} FROM product_field_evidence
     WHERE version_id = ?1 ORDER BY rowid"
  ))?;
  stmt
    .query_map(rusqlite::params![version_id], RawEvidence::from_row)?
    .collect()
}

/// Only a unique-index collision is worth retrying; CHECK, NOT NULL and
/// foreign key failures are not.
fn is_unique_violation(err: &tokio_rusqlite::Error) -> bool {
  matches!(
    err,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))
      if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

// ─── VersionStore impl ───────────────────────────────────────────────────────

impl VersionStore for SqliteStore {
  type Error = Error;

  async fn save_draft(&self, input: DraftInput) -> Result<ProductVersion> {
    let now = Utc::now();
    let now_str = encode_dt(now);
    let fields_json = serde_json::to_string(&input.fields)?;
    let score_json = serde_json::to_string(&input.score)?;
    let product_id = input.product_id;
    let actor = input.actor;
    let evidence = input.evidence;
    let evidence_count = evidence.len();
    let fresh_id = Uuid::new_v4();

    let raw: RawVersion = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing: Option<(String, String, String)> = tx
          .query_row(
            "SELECT id, created_by, created_at FROM product_versions
             WHERE product_id = ?1 AND status = 'draft'",
            rusqlite::params![product_id],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
          )
          .optional()?;

        let (id, created_by, created_at) = match existing {
          Some((id, created_by, created_at)) => {
            tx.execute(
              "UPDATE product_versions
               SET fields_json = ?2, score_json = ?3, updated_at = ?4
               WHERE id = ?1",
              rusqlite::params![id, fields_json, score_json, now_str],
            )?;
            (id, created_by, created_at)
          }
          None => {
            let id = encode_uuid(fresh_id);
            tx.execute(
              &format!(
                "INSERT INTO product_versions ({VERSION_COLUMNS})
                 VALUES (?1, ?2, 'draft', 0, ?3, ?4, ?5, ?6, ?6)"
              ),
              rusqlite::params![
                id,
                product_id,
                fields_json,
                score_json,
                actor,
                now_str,
              ],
            )?;
            (id, actor.clone(), now_str.clone())
          }
        };

        tx.execute(
          "DELETE FROM product_field_evidence WHERE version_id = ?1",
          rusqlite::params![id],
        )?;

        let version_id = Uuid::parse_str(&id)
          .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
        for item in evidence {
          RawEvidence::from_new(item, version_id, &actor, now).insert(&tx)?;
        }

        tx.commit()?;

        Ok(RawVersion {
          id,
          product_id,
          status: "draft".to_owned(),
          version: 0,
          fields_json,
          score_json,
          created_by,
          created_at,
          updated_at: now_str,
        })
      })
      .await?;

    let version = raw.into_version()?;
    debug!(
      product_id = %version.product_id,
      draft_id = %version.id,
      evidence = evidence_count,
      "saved draft"
    );
    Ok(version)
  }

  async fn get_draft<'a>(
    &'a self,
    product_id: &'a str,
  ) -> Result<Option<VersionWithEvidence>> {
    self.load_with_evidence(product_id, "draft", None).await
  }

  async fn publish<'a>(
    &'a self,
    product_id: &'a str,
    actor: &'a str,
  ) -> Result<PublishOutcome> {
    for attempt in 1..=PUBLISH_ATTEMPTS {
      match self.try_publish(product_id, actor).await {
        Ok(Some(outcome)) => {
          info!(
            product_id,
            version = outcome.version,
            published_version_id = %outcome.published_version_id,
            actor,
            "published draft"
          );
          return Ok(outcome);
        }
        Ok(None) => return Err(Error::NoDraft(product_id.to_owned())),
        Err(e) if is_unique_violation(&e) => {
          warn!(product_id, attempt, "version number collision during publish");
        }
        Err(e) => return Err(e.into()),
      }
    }
    Err(Error::VersionConflict(product_id.to_owned()))
  }

  async fn get_latest_published<'a>(
    &'a self,
    product_id: &'a str,
  ) -> Result<Option<VersionWithEvidence>> {
    self.load_with_evidence(product_id, "published", None).await
  }

  async fn get_published<'a>(
    &'a self,
    product_id: &'a str,
    version: u32,
  ) -> Result<Option<VersionWithEvidence>> {
    self
      .load_with_evidence(product_id, "published", Some(version))
      .await
  }

  async fn list_published<'a>(
    &'a self,
    product_id: &'a str,
  ) -> Result<Vec<ProductVersion>> {
    let product_id = product_id.to_owned();

    let rows: Vec<RawVersion> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {VERSION_COLUMNS} FROM product_versions
           WHERE product_id = ?1 AND status = 'published'
           ORDER BY version ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![product_id], RawVersion::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows.into_iter().map(RawVersion::into_version).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn failure(extended_code: std::os::raw::c_int) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
      rusqlite::ffi::Error::new(extended_code),
      None,
    ))
  }

  #[test]
  fn only_unique_collisions_are_retried() {
    assert!(is_unique_violation(&failure(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE)));

    for code in [
      rusqlite::ffi::SQLITE_CONSTRAINT_CHECK,
      rusqlite::ffi::SQLITE_CONSTRAINT_NOTNULL,
      rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
      rusqlite::ffi::SQLITE_BUSY,
    ] {
      assert!(!is_unique_violation(&failure(code)), "code {code}");
    }
    assert!(!is_unique_violation(&tokio_rusqlite::Error::ConnectionClosed));
  }
}
