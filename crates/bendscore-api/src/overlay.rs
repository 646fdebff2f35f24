//! Handler for overlay administration.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/overlay/reload` | Re-read the overlay file; requires auth |

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::info;

use crate::{ApiState, actor::Actor, error::ApiError};

#[derive(Debug, Serialize)]
pub struct Reloaded {
  pub patches: usize,
}

/// `POST /overlay/reload`
///
/// On failure the previously loaded patches stay in effect.
pub async fn reload<S>(
  State(state): State<ApiState<S>>,
  Actor(actor): Actor,
) -> Result<Json<Reloaded>, ApiError> {
  let patches = state.overlay.reload()?;
  info!(%actor, patches, "overlay reload requested");
  Ok(Json(Reloaded { patches }))
}
