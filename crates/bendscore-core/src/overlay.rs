//! Overlay store and record merge.
//!
//! An overlay is an admin-edited partial patch keyed by product id. The
//! [`OverlayStore`] holds the current set in memory and is refreshed only when
//! [`OverlayStore::reload`] is called; nothing watches the file.
//!
//! [`merge`] produces the record the adapter consumes:
//! base specs, then the overlay patch, then the latest published fields, each
//! layer replacing whole keys of the one below. This is the one place that
//! splits delimited strings into lists.

use std::{
  collections::HashMap,
  path::{Path, PathBuf},
  sync::{PoisonError, RwLock},
};

use serde_json::{Map, Value};

use crate::{Error, Result, catalog::BaseRecord};

/// A partial set of fields for one product.
pub type FieldPatch = Map<String, Value>;

/// Keys whose values are lists; a string in one of these is split on
/// `,`, `;`, `|` or newlines.
const LIST_FIELDS: &[&str] = &[
  "materials",
  "dieShapes",
  "die_shapes",
  "dies",
  "upgrades",
  "upgradePath",
  "upgrade_path",
];

// ─── Store ───────────────────────────────────────────────────────────────────

/// The current overlay patches, shared by reference between handlers.
#[derive(Debug, Default)]
pub struct OverlayStore {
  path:    Option<PathBuf>,
  patches: RwLock<HashMap<String, FieldPatch>>,
}

impl OverlayStore {
  /// An overlay with no patches and no backing file.
  pub fn empty() -> Self { Self::default() }

  /// An overlay with fixed patches and no backing file.
  pub fn from_patches(patches: HashMap<String, FieldPatch>) -> Self {
    Self {
      path:    None,
      patches: RwLock::new(patches),
    }
  }

  /// Load the overlay file at `path`. A missing file is an empty overlay.
  pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
    let path = path.into();
    let patches = read_patches(&path)?;
    tracing::info!(path = %path.display(), patches = patches.len(), "loaded overlay");
    Ok(Self {
      path:    Some(path),
      patches: RwLock::new(patches),
    })
  }

  /// Re-read the backing file and swap in its contents.
  ///
  /// On error the previous patches stay in place. Returns the number of
  /// patches now loaded.
  pub fn reload(&self) -> Result<usize> {
    let Some(path) = &self.path else {
      return Ok(self.len());
    };
    let fresh = read_patches(path)?;
    let count = fresh.len();
    *self.patches.write().unwrap_or_else(PoisonError::into_inner) = fresh;
    tracing::info!(path = %path.display(), patches = count, "reloaded overlay");
    Ok(count)
  }

  /// The patch for `product_id`, if any.
  pub fn patch(&self, product_id: &str) -> Option<FieldPatch> {
    self
      .patches
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .get(product_id)
      .cloned()
  }

  pub fn len(&self) -> usize {
    self.patches.read().unwrap_or_else(PoisonError::into_inner).len()
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

fn read_patches(path: &Path) -> Result<HashMap<String, FieldPatch>> {
  let text = match std::fs::read_to_string(path) {
    Ok(t) => t,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
      return Ok(HashMap::new());
    }
    Err(source) => {
      return Err(Error::Io {
        path: path.to_path_buf(),
        source,
      });
    }
  };
  serde_json::from_str(&text).map_err(|e| Error::MalformedOverlay {
    path:   path.to_path_buf(),
    reason: e.to_string(),
  })
}

// ─── Merge ───────────────────────────────────────────────────────────────────

/// Layer `overlay` and then `published` onto `base`.
///
/// A `null` in a patch removes the key. Only overlay values have delimited
/// list strings split; published fields are taken as stored.
pub fn merge(
  base: &BaseRecord,
  overlay: Option<&FieldPatch>,
  published: Option<&FieldPatch>,
) -> Map<String, Value> {
  let mut record = base.to_record();
  if let Some(overlay) = overlay {
    apply(&mut record, split_list_fields(overlay));
  }
  if let Some(published) = published {
    apply(&mut record, published.clone());
  }
  record
}

fn apply(record: &mut Map<String, Value>, patch: FieldPatch) {
  for (key, value) in patch {
    if value.is_null() {
      record.remove(&key);
    } else {
      record.insert(key, value);
    }
  }
}

/// Copy `patch`, turning delimited strings in list-valued keys into arrays.
pub fn split_list_fields(patch: &FieldPatch) -> FieldPatch {
  patch
    .iter()
    .map(|(key, value)| {
      let value = match value {
        Value::String(s) if LIST_FIELDS.contains(&key.as_str()) => {
          Value::Array(split_delimited(s).map(Value::String).collect())
        }
        other => other.clone(),
      };
      (key.clone(), value)
    })
    .collect()
}

fn split_delimited(s: &str) -> impl Iterator<Item = String> + '_ {
  s.split([',', ';', '|', '\n'])
    .map(str::trim)
    .filter(|part| !part.is_empty())
    .map(str::to_owned)
}
