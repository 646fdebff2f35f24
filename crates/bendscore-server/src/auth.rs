//! HTTP Basic-auth verification and the middleware guarding write routes.

use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{Request, State},
  http::{HeaderMap, Method},
  middleware::Next,
  response::{IntoResponse, Response},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use bendscore_api::Actor;

use crate::error::Error;

/// Credentials accepted as valid for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// Verify Basic credentials in `headers`, returning the authenticated
/// username.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<String, Error> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;

  if username != config.username {
    return Err(Error::Unauthorized);
  }

  let parsed_hash = PasswordHash::new(&config.password_hash)
    .map_err(|_| Error::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Error::Unauthorized)?;

  Ok(username.to_owned())
}

fn is_read_only(method: &Method) -> bool {
  matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Middleware: reads pass through; anything else must carry valid credentials,
/// and the verified username is attached as the request's [`Actor`].
pub async fn require_auth_for_writes(
  State(auth): State<Arc<AuthConfig>>,
  mut req: Request,
  next: Next,
) -> Response {
  if is_read_only(req.method()) {
    return next.run(req).await;
  }
  match verify_auth(req.headers(), &auth) {
    Ok(username) => {
      req.extensions_mut().insert(Actor(username));
      next.run(req).await
    }
    Err(e) => {
      tracing::debug!(method = %req.method(), uri = %req.uri(), "rejected unauthenticated write");
      e.into_response()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::header;

  fn make_auth(password: &str) -> AuthConfig {
    use argon2::{PasswordHasher, password_hash::SaltString};
    use rand_core::OsRng;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();

    AuthConfig {
      username:      "editor".to_string(),
      password_hash: hash,
    }
  }

  fn headers(value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, value.parse().unwrap());
    h
  }

  fn basic(user: &str, pass: &str) -> String {
    let encoded = B64.encode(format!("{user}:{pass}"));
    format!("Basic {encoded}")
  }

  #[test]
  fn correct_credentials_yield_username() {
    let auth = make_auth("secret");
    let user = verify_auth(&headers(&basic("editor", "secret")), &auth).unwrap();
    assert_eq!(user, "editor");
  }

  #[test]
  fn wrong_password() {
    let auth = make_auth("secret");
    let result = verify_auth(&headers(&basic("editor", "wrong")), &auth);
    assert!(matches!(result, Err(Error::Unauthorized)));
  }

  #[test]
  fn wrong_username() {
    let auth = make_auth("secret");
    let result = verify_auth(&headers(&basic("intruder", "secret")), &auth);
    assert!(matches!(result, Err(Error::Unauthorized)));
  }

  #[test]
  fn missing_header() {
    let auth = make_auth("secret");
    assert!(matches!(
      verify_auth(&HeaderMap::new(), &auth),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn invalid_base64() {
    let auth = make_auth("secret");
    let result = verify_auth(&headers("Basic !!!not-base64!!!"), &auth);
    assert!(matches!(result, Err(Error::Unauthorized)));
  }

  #[test]
  fn read_methods_skip_auth() {
    assert!(is_read_only(&Method::GET));
    assert!(is_read_only(&Method::HEAD));
    assert!(!is_read_only(&Method::PUT));
    assert!(!is_read_only(&Method::POST));
  }
}
