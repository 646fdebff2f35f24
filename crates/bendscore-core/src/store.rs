//! The `VersionStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `bendscore-store-sqlite`). Higher layers depend on this abstraction, not on
//! any concrete backend.

use std::future::Future;

use crate::version::{
  DraftInput, ProductVersion, PublishOutcome, VersionWithEvidence,
};

/// Store errors that callers are expected to handle rather than report as
/// failures.
pub trait WorkflowError {
  /// `true` when publish was rejected because the product has no draft.
  fn is_no_draft(&self) -> bool;
}

/// Draft/publish persistence for product data.
///
/// Every mutating method runs as a single transaction: on error nothing it
/// would have written is visible.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait VersionStore: Send + Sync {
  type Error: std::error::Error + WorkflowError + Send + Sync + 'static;

  /// Create or replace the product's single draft, and replace its evidence
  /// wholesale with `input.evidence`.
  ///
  /// The draft row keeps its id across saves. Returns the stored draft.
  fn save_draft(
    &self,
    input: DraftInput,
  ) -> impl Future<Output = Result<ProductVersion, Self::Error>> + Send + '_;

  /// The current draft and its evidence, or `None` if the product has none.
  fn get_draft<'a>(
    &'a self,
    product_id: &'a str,
  ) -> impl Future<Output = Result<Option<VersionWithEvidence>, Self::Error>>
  + Send
  + 'a;

  /// Snapshot the current draft as the next published version.
  ///
  /// Fails with a "no draft" error when the product has no draft, in which
  /// case nothing is written. Active draft evidence is copied onto the new
  /// version; the draft itself is left in place.
  fn publish<'a>(
    &'a self,
    product_id: &'a str,
    actor: &'a str,
  ) -> impl Future<Output = Result<PublishOutcome, Self::Error>> + Send + 'a;

  /// The highest-numbered published version and its evidence, or `None`.
  fn get_latest_published<'a>(
    &'a self,
    product_id: &'a str,
  ) -> impl Future<Output = Result<Option<VersionWithEvidence>, Self::Error>>
  + Send
  + 'a;

  /// One published version by number, with the evidence captured when it was
  /// published, or `None`.
  fn get_published<'a>(
    &'a self,
    product_id: &'a str,
    version: u32,
  ) -> impl Future<Output = Result<Option<VersionWithEvidence>, Self::Error>>
  + Send
  + 'a;

  /// Every published version of the product, oldest first. Evidence is not
  /// included.
  fn list_published<'a>(
    &'a self,
    product_id: &'a str,
  ) -> impl Future<Output = Result<Vec<ProductVersion>, Self::Error>> + Send + 'a;
}
