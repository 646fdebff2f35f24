//! Handlers for product listing and scoring.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/products` | Every catalog product with its current score |
//! | `GET`  | `/products/{id}/score` | 404 if neither catalogued nor published |
//!
//! The current record is the base catalog entry, overlaid by the admin patch,
//! overlaid by the latest published fields. Scores are recomputed on every
//! read.

use axum::{
  Json,
  extract::{Path, State},
};
use bendscore_core::{
  ProductScore,
  catalog::BaseRecord,
  overlay::merge,
  score_record,
  store::VersionStore,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{ApiState, error::ApiError};

// ─── Record assembly ─────────────────────────────────────────────────────────

/// Merge every layer for `id`. `None` when the product is unknown to both the
/// catalog and `fields`.
pub(crate) fn assemble<S>(
  state: &ApiState<S>,
  id: &str,
  fields: Option<&Map<String, Value>>,
) -> Option<Map<String, Value>> {
  let base = match (state.catalog.product(id), fields) {
    (Some(base), _) => base,
    (None, Some(_)) => BaseRecord {
      id:    id.to_owned(),
      brand: String::new(),
      model: String::new(),
      specs: Map::new(),
    },
    (None, None) => return None,
  };
  let patch = state.overlay.patch(id);
  Some(merge(&base, patch.as_ref(), fields))
}

/// The record as visitors currently see it.
async fn current_record<S>(
  state: &ApiState<S>,
  id: &str,
) -> Result<Option<Map<String, Value>>, ApiError>
where
  S: VersionStore,
{
  let published = state
    .store
    .get_latest_published(id)
    .await
    .map_err(ApiError::store)?;
  let fields = published.as_ref().and_then(|p| p.version.fields.as_object());
  Ok(assemble(state, id, fields))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ProductSummary {
  pub id:    String,
  pub brand: String,
  pub model: String,
  pub score: ProductScore,
}

/// `GET /products`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<ProductSummary>>, ApiError>
where
  S: VersionStore,
{
  let mut summaries = Vec::new();
  for base in state.catalog.products() {
    let score = current_record(&state, &base.id)
      .await?
      .map(|record| score_record(&record))
      .unwrap_or_else(ProductScore::none);
    summaries.push(ProductSummary {
      id: base.id,
      brand: base.brand,
      model: base.model,
      score,
    });
  }
  Ok(Json(summaries))
}

// ─── Score ────────────────────────────────────────────────────────────────────

/// `GET /products/{id}/score`
pub async fn score<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<ProductScore>, ApiError>
where
  S: VersionStore,
{
  let record = current_record(&state, &id)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("product {id} not found")))?;
  Ok(Json(score_record(&record)))
}
