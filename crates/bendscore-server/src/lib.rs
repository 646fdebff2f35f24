//! HTTP host for the bendscore API.
//!
//! Wires configuration, the product catalog, the overlay file, and a
//! [`VersionStore`] into the [`bendscore_api`] router, guarded by Basic auth on
//! write requests and traced with `tower_http`.

pub mod auth;
pub mod error;

pub use error::{Error, Result};

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware};
use bendscore_api::{ApiState, api_router};
use bendscore_core::{catalog::StaticCatalog, overlay::OverlayStore, store::VersionStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::{AuthConfig, require_auth_for_writes};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  /// JSON array of base product records.
  pub catalog_path:       PathBuf,
  /// JSON object of per-product field patches. A missing file means no
  /// patches.
  #[serde(default)]
  pub overlay_path:       Option<PathBuf>,
  pub auth_username:      String,
  pub auth_password_hash: String,
}

impl ServerConfig {
  pub fn auth(&self) -> AuthConfig {
    AuthConfig {
      username:      self.auth_username.clone(),
      password_hash: self.auth_password_hash.clone(),
    }
  }
}

/// Load the catalog and overlay named by `config`.
pub fn load_sources(config: &ServerConfig) -> Result<(StaticCatalog, OverlayStore)> {
  let catalog = StaticCatalog::from_path(&config.catalog_path)?;
  let overlay = match &config.overlay_path {
    Some(path) => OverlayStore::open(path)?,
    None => OverlayStore::empty(),
  };
  Ok((catalog, overlay))
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state for the whole server.
pub struct AppState<S> {
  pub api:  ApiState<S>,
  pub auth: Arc<AuthConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      api:  self.api.clone(),
      auth: Arc::clone(&self.auth),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete axum [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: VersionStore + 'static,
{
  api_router(state.api)
    .layer(middleware::from_fn_with_state(state.auth, require_auth_for_writes))
    .layer(TraceLayer::new_for_http())
}
