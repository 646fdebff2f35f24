//! Error type for `bendscore-store-sqlite`.

use bendscore_core::store::WorkflowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] bendscore_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("invalid stored value: {0}")]
  InvalidColumn(String),

  /// Publish was requested for a product with no draft.
  #[error("no draft exists for product {0:?}")]
  NoDraft(String),

  /// Concurrent publishes kept colliding on the same version number.
  #[error("could not allocate a version number for product {0:?}")]
  VersionConflict(String),
}

impl WorkflowError for Error {
  fn is_no_draft(&self) -> bool { matches!(self, Self::NoDraft(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
