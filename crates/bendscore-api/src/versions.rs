//! Handlers for the draft/publish workflow.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/products/{id}/draft` | `{"draft": null, "evidence": []}` when none |
//! | `PUT`  | `/products/{id}/draft` | Body: `{"fields":{…},"evidence":[…]}`; requires auth |
//! | `POST` | `/products/{id}/publish` | 409 if the product has no draft; requires auth |
//! | `GET`  | `/products/{id}/published` | Latest published version or `null` |
//! | `GET`  | `/products/{id}/versions` | Published history, oldest first |
//! | `GET`  | `/products/{id}/versions/{version}` | One published version with its evidence; 404 if absent |

use axum::{
  Json,
  extract::{Path, State},
};
use bendscore_core::{
  score_record,
  store::VersionStore,
  version::{
    DraftInput, FieldEvidence, NewEvidence, ProductVersion, PublishOutcome,
    VersionWithEvidence,
  },
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{ApiState, actor::Actor, error::ApiError, products::assemble};

// ─── Get draft ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DraftView {
  pub draft:    Option<ProductVersion>,
  pub evidence: Vec<FieldEvidence>,
}

/// `GET /products/{id}/draft`
pub async fn get_draft<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<DraftView>, ApiError>
where
  S: VersionStore,
{
  let view = match state.store.get_draft(&id).await.map_err(ApiError::store)? {
    Some(VersionWithEvidence { version, evidence }) => DraftView {
      draft: Some(version),
      evidence,
    },
    None => DraftView { draft: None, evidence: Vec::new() },
  };
  Ok(Json(view))
}

// ─── Save draft ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DraftBody {
  pub fields:   Map<String, Value>,
  #[serde(default)]
  pub evidence: Vec<NewEvidence>,
}

#[derive(Debug, Serialize)]
pub struct SavedDraft {
  pub draft_version_id: Uuid,
}

/// `PUT /products/{id}/draft`
///
/// Stores the fields together with a score snapshot computed from the record
/// as it would read once these fields are published.
pub async fn save_draft<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
  Actor(actor): Actor,
  Json(body): Json<DraftBody>,
) -> Result<Json<SavedDraft>, ApiError>
where
  S: VersionStore,
{
  let blank = body.evidence.iter().position(|e| e.field_key.trim().is_empty());
  if let Some(blank) = blank {
    return Err(ApiError::BadRequest(format!(
      "evidence[{blank}] has an empty field_key"
    )));
  }

  let score = assemble(&state, &id, Some(&body.fields))
    .map(|record| score_record(&record))
    .unwrap_or_else(bendscore_core::ProductScore::none);

  let draft = state
    .store
    .save_draft(DraftInput {
      product_id: id,
      fields:     Value::Object(body.fields),
      score:      serde_json::to_value(&score)?,
      evidence:   body.evidence,
      actor,
    })
    .await
    .map_err(ApiError::store)?;

  Ok(Json(SavedDraft { draft_version_id: draft.id }))
}

// ─── Publish ─────────────────────────────────────────────────────────────────

/// `POST /products/{id}/publish`
pub async fn publish<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
  Actor(actor): Actor,
) -> Result<Json<PublishOutcome>, ApiError>
where
  S: VersionStore,
{
  let outcome = state
    .store
    .publish(&id, &actor)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(outcome))
}

// ─── Published reads ─────────────────────────────────────────────────────────

/// `GET /products/{id}/published`
pub async fn published<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Option<VersionWithEvidence>>, ApiError>
where
  S: VersionStore,
{
  let latest = state
    .store
    .get_latest_published(&id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(latest))
}

/// `GET /products/{id}/versions`
pub async fn history<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Vec<ProductVersion>>, ApiError>
where
  S: VersionStore,
{
  let versions = state
    .store
    .list_published(&id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(versions))
}

/// `GET /products/{id}/versions/{version}`
pub async fn published_version<S>(
  State(state): State<ApiState<S>>,
  Path((id, version)): Path<(String, u32)>,
) -> Result<Json<VersionWithEvidence>, ApiError>
where
  S: VersionStore,
{
  state
    .store
    .get_published(&id, version)
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or_else(|| {
      ApiError::NotFound(format!("{id} has no published version {version}"))
    })
}
