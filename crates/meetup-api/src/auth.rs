//! Authentication Gate.
//!
//! [`authenticate`] is the only code that reads the `Authorization` header.
//! It verifies the bearer token and leaves the decoded [`Identity`] in the
//! request extensions, where handlers and later gates pick it up through the
//! [`Authenticated`] extractor.

use std::sync::Arc;

use axum::{
  extract::{FromRequestParts, OptionalFromRequestParts, Request, State},
  http::{HeaderMap, header::AUTHORIZATION, request::Parts},
  middleware::Next,
  response::Response,
};
use meetup_core::Identity;
use tracing::warn;

use crate::{credentials::Credentials, error::ApiError};

/// Route middleware: reject the request unless it carries a valid bearer
/// token.
pub async fn authenticate(
  State(credentials): State<Arc<Credentials>>,
  mut req: Request,
  next: Next,
) -> Result<Response, ApiError> {
  let token = bearer_token(req.headers()).inspect_err(|e| {
    warn!(path = %req.uri().path(), reason = %e, "unauthenticated request");
  })?;
  let identity = credentials.verify_token(token)?;
  req.extensions_mut().insert(identity);
  Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
  let value = headers
    .get(AUTHORIZATION)
    .ok_or_else(|| ApiError::Unauthorized("Missing authorization token".to_string()))?;
  let value = value.to_str().map_err(|_| {
    ApiError::Unauthorized("Authorization header must use the Bearer scheme".to_string())
  })?;

  match value.split_once(' ') {
    Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
      Ok(token.trim())
    }
    _ => Err(ApiError::Unauthorized(
      "Authorization header must use the Bearer scheme".to_string(),
    )),
  }
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// The identity placed on the request by [`authenticate`].
///
/// Use `Option<Authenticated>` on routes that do not run the gate.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

impl<S: Send + Sync> FromRequestParts<S> for Authenticated {
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    parts
      .extensions
      .get::<Identity>()
      .cloned()
      .map(Authenticated)
      .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
  }
}

impl<S: Send + Sync> OptionalFromRequestParts<S> for Authenticated {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Option<Self>, Self::Rejection> {
    Ok(parts.extensions.get::<Identity>().cloned().map(Authenticated))
  }
}

#[cfg(test)]
mod tests {
  use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Request, StatusCode},
    middleware::from_fn_with_state,
    routing::get,
  };
  use chrono::Duration;
  use meetup_core::Role;
  use tower::ServiceExt;

  use super::*;

  fn headers(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    headers
  }

  #[test]
  fn extracts_bearer_token() {
    assert_eq!(bearer_token(&headers("Bearer abc")).unwrap(), "abc");
    assert_eq!(bearer_token(&headers("bearer abc")).unwrap(), "abc");
  }

  #[test]
  fn rejects_missing_or_foreign_scheme() {
    assert!(matches!(
      bearer_token(&HeaderMap::new()),
      Err(ApiError::Unauthorized(m)) if m == "Missing authorization token"
    ));
    assert!(matches!(bearer_token(&headers("Basic abc")), Err(ApiError::Unauthorized(_))));
    assert!(matches!(bearer_token(&headers("Bearer ")), Err(ApiError::Unauthorized(_))));
    assert!(matches!(bearer_token(&headers("abc")), Err(ApiError::Unauthorized(_))));
  }

  async fn whoami(Authenticated(identity): Authenticated) -> String { identity.id }

  fn app(credentials: Arc<Credentials>) -> Router {
    Router::new()
      .route("/me", get(whoami))
      .route_layer(from_fn_with_state(credentials, authenticate))
  }

  #[tokio::test]
  async fn valid_token_reaches_the_handler_with_its_identity() {
    let credentials = Arc::new(Credentials::new("s", Duration::hours(1)));
    let token = credentials
      .sign_token(&Identity { id: "u1".into(), role: Role::User })
      .unwrap();

    let resp = app(credentials)
      .oneshot(
        Request::get("/me")
          .header(AUTHORIZATION, format!("Bearer {token}"))
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"u1");
  }

  #[tokio::test]
  async fn missing_or_bad_token_is_401() {
    let credentials = Arc::new(Credentials::new("s", Duration::hours(1)));

    let resp = app(credentials.clone())
      .oneshot(Request::get("/me").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app(credentials)
      .oneshot(
        Request::get("/me")
          .header(AUTHORIZATION, "Bearer forged")
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }
}
