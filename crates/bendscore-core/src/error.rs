//! Error types for `bendscore-core`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown version status: {0:?}")]
  UnknownStatus(String),

  #[error("unknown evidence source type: {0:?}")]
  UnknownSourceType(String),

  #[error("catalog file {path:?} is malformed: {reason}")]
  MalformedCatalog { path: PathBuf, reason: String },

  #[error("overlay file {path:?} is malformed: {reason}")]
  MalformedOverlay { path: PathBuf, reason: String },

  #[error("i/o error reading {path:?}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
