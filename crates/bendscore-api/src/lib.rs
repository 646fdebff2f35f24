//! JSON REST API for bendscore.
//!
//! Exposes an axum [`Router`] backed by any
//! [`bendscore_core::store::VersionStore`], a [`Catalog`] of base records, and
//! an [`OverlayStore`]. Authentication is the caller's responsibility: write
//! routes require an [`Actor`] in the request extensions, which the hosting
//! server inserts after verifying credentials.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(bendscore_api::api_router(state))
//! ```

pub mod actor;
pub mod error;
pub mod overlay;
pub mod products;
pub mod versions;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use bendscore_core::{catalog::Catalog, overlay::OverlayStore, store::VersionStore};

pub use actor::Actor;
pub use error::ApiError;

// ─── State ───────────────────────────────────────────────────────────────────

/// Everything the handlers read from.
pub struct ApiState<S> {
  pub store:   Arc<S>,
  pub catalog: Arc<dyn Catalog>,
  pub overlay: Arc<OverlayStore>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:   Arc::clone(&self.store),
      catalog: Arc::clone(&self.catalog),
      overlay: Arc::clone(&self.overlay),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: VersionStore + 'static,
{
  Router::new()
    // Products and scores
    .route("/products", get(products::list::<S>))
    .route("/products/{id}/score", get(products::score::<S>))
    // Draft / publish workflow
    .route(
      "/products/{id}/draft",
      get(versions::get_draft::<S>).put(versions::save_draft::<S>),
    )
    .route("/products/{id}/publish", post(versions::publish::<S>))
    .route("/products/{id}/published", get(versions::published::<S>))
    .route("/products/{id}/versions", get(versions::history::<S>))
    .route(
      "/products/{id}/versions/{version}",
      get(versions::published_version::<S>),
    )
    // Overlay administration
    .route("/overlay/reload", post(overlay::reload::<S>))
    .with_state(state)
}
