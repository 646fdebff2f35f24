//! The base catalog contract.
//!
//! Every data source that supplies base product records implements
//! [`Catalog`]. Base records are immutable; edits arrive through overlays and
//! published versions (see [`crate::overlay`]).

use std::{collections::HashSet, path::Path};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// One product as shipped in the base catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseRecord {
  pub id:    String,
  pub brand: String,
  pub model: String,
  /// Every other static specification, untyped.
  #[serde(flatten)]
  pub specs: Map<String, Value>,
}

impl BaseRecord {
  /// Flatten into the loosely-typed record shape the adapter consumes.
  pub fn to_record(&self) -> Map<String, Value> {
    let mut record = self.specs.clone();
    record.insert("id".into(), Value::String(self.id.clone()));
    record.insert("brand".into(), Value::String(self.brand.clone()));
    record.insert("model".into(), Value::String(self.model.clone()));
    record
  }
}

/// A source of base product records, in display order.
pub trait Catalog: Send + Sync {
  fn products(&self) -> Vec<BaseRecord>;

  /// Look up a single product by id.
  fn product(&self, id: &str) -> Option<BaseRecord> {
    self.products().into_iter().find(|p| p.id == id)
  }
}

/// A catalog held in memory, typically loaded once from a JSON file.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
  records: Vec<BaseRecord>,
}

impl StaticCatalog {
  /// Build a catalog from records. Ids must be unique.
  pub fn new(records: Vec<BaseRecord>) -> Result<Self> {
    let mut seen = HashSet::new();
    for r in &records {
      if !seen.insert(r.id.as_str()) {
        return Err(Error::MalformedCatalog {
          path:   "<memory>".into(),
          reason: format!("duplicate product id {:?}", r.id),
        });
      }
    }
    Ok(Self { records })
  }

  /// Load a JSON array of records from `path`.
  pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
      path: path.to_path_buf(),
      source,
    })?;
    let records: Vec<BaseRecord> =
      serde_json::from_str(&text).map_err(|e| Error::MalformedCatalog {
        path:   path.to_path_buf(),
        reason: e.to_string(),
      })?;
    let catalog = Self::new(records).map_err(|e| match e {
      Error::MalformedCatalog { reason, .. } => Error::MalformedCatalog {
        path: path.to_path_buf(),
        reason,
      },
      other => other,
    })?;
    tracing::info!(path = %path.display(), products = catalog.records.len(), "loaded catalog");
    Ok(catalog)
  }

  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }
}

impl Catalog for StaticCatalog {
  fn products(&self) -> Vec<BaseRecord> { self.records.clone() }

  fn product(&self, id: &str) -> Option<BaseRecord> {
    self.records.iter().find(|p| p.id == id).cloned()
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn record(id: &str) -> BaseRecord {
    serde_json::from_value(json!({
      "id": id,
      "brand": "Acme",
      "model": "B-1",
      "bendAngle": 180,
    }))
    .unwrap()
  }

  #[test]
  fn flattened_specs_roundtrip_into_record() {
    let r = record("acme-b1");
    assert_eq!(r.specs.get("bendAngle"), Some(&json!(180)));
    let flat = r.to_record();
    assert_eq!(flat["id"], "acme-b1");
    assert_eq!(flat["brand"], "Acme");
    assert_eq!(flat["bendAngle"], 180);
  }

  #[test]
  fn duplicate_ids_are_rejected() {
    let err = StaticCatalog::new(vec![record("a"), record("a")]).unwrap_err();
    assert!(matches!(err, Error::MalformedCatalog { .. }));
  }

  #[test]
  fn lookup_preserves_order_and_finds_by_id() {
    let catalog =
      StaticCatalog::new(vec![record("b"), record("a"), record("c")]).unwrap();
    let ids: Vec<_> = catalog.products().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, ["b", "a", "c"]);
    assert_eq!(catalog.product("a").map(|p| p.id).as_deref(), Some("a"));
    assert!(catalog.product("zzz").is_none());
  }

  #[test]
  fn from_path_reports_missing_file() {
    let err = StaticCatalog::from_path("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
  }

  #[test]
  fn from_path_names_the_file_on_bad_json() {
    let path = std::env::temp_dir()
      .join(format!("bendscore-catalog-{}.json", uuid::Uuid::new_v4()));
    std::fs::write(&path, r#"[{ "id": "a", "brand": "Acme" "#).unwrap();

    let err = StaticCatalog::from_path(&path).unwrap_err();
    match err {
      Error::MalformedCatalog { path: reported, .. } => assert_eq!(reported, path),
      other => panic!("expected MalformedCatalog, got {other:?}"),
    }

    std::fs::remove_file(&path).ok();
  }
}
