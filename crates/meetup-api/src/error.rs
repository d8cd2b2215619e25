//! API error type and the single place errors become HTTP responses.

use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Set once at startup; only development servers echo internal errors.
static EXPOSE_INTERNAL: AtomicBool = AtomicBool::new(false);

/// Include the raw cause in 5xx bodies. Call once while booting.
pub fn expose_internal_errors(enabled: bool) {
  EXPOSE_INTERNAL.store(enabled, Ordering::Relaxed);
}

/// An error returned by a handler, middleware or controller operation.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  BadRequest(String),

  #[error("{0}")]
  Unauthorized(String),

  #[error("{0}")]
  Forbidden(String),

  #[error("{0}")]
  NotFound(String),

  /// Input failed schema validation.
  #[error("{0}")]
  NotAcceptable(String),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::NotAcceptable(_) => StatusCode::NOT_ACCEPTABLE,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  pub fn internal(message: impl Into<String>) -> Self {
    let message: String = message.into();
    ApiError::Internal(message.into())
  }
}

impl From<meetup_core::Error> for ApiError {
  fn from(err: meetup_core::Error) -> Self {
    use meetup_core::Error as Core;
    match err {
      Core::BadRequest(m) => ApiError::BadRequest(m),
      Core::NotFound(m) => ApiError::NotFound(m),
      Core::Storage(e) => ApiError::Internal(e),
      Core::Internal(m) => ApiError::internal(m),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
  status:      u16,
  status_text: &'static str,
  message:     String,
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = match &self {
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "internal error");
        if EXPOSE_INTERNAL.load(Ordering::Relaxed) {
          e.to_string()
        } else {
          "Internal Server Error".to_string()
        }
      }
      other => other.to_string(),
    };

    let body = ErrorBody {
      status: status.as_u16(),
      status_text: status.canonical_reason().unwrap_or("Unknown"),
      message,
    };
    (status, Json(body)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  async fn body_json(resp: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  #[tokio::test]
  async fn renders_status_text_and_message() {
    let resp = ApiError::Forbidden("not yours".into()).into_response();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body = body_json(resp).await;
    assert_eq!(body["status"], 403);
    assert_eq!(body["statusText"], "Forbidden");
    assert_eq!(body["message"], "not yours");
  }

  #[tokio::test]
  async fn internal_errors_are_masked_by_default() {
    let resp = ApiError::internal("disk on fire").into_response();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await;
    assert_eq!(body["message"], "Internal Server Error");
  }

  #[test]
  fn core_errors_keep_their_kind() {
    let err: ApiError = meetup_core::Error::not_found("User", "42").into();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
    assert_eq!(err.to_string(), "User 42 not found");
  }
}
