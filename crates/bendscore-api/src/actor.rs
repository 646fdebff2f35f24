//! The authenticated user behind a write request.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;

/// Username of the authenticated caller.
///
/// Read from the request extensions; the hosting server inserts it once the
/// request's credentials check out. Extraction fails with
/// [`ApiError::Unauthorized`] when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor(pub String);

impl<St> FromRequestParts<St> for Actor
where
  St: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &St,
  ) -> Result<Self, Self::Rejection> {
    parts
      .extensions
      .get::<Actor>()
      .cloned()
      .ok_or(ApiError::Unauthorized)
  }
}
