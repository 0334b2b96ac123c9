//! API error type and [`axum::response::IntoResponse`] implementation.

use std::error::Error as StdError;

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn StdError + Send + Sync>),
}

impl ApiError {
  /// Map a backend error, surfacing domain failures (duplicate RUT, bad
  /// RUT, ...) found anywhere in its source chain with a precise status.
  pub fn from_store<E>(e: E) -> Self
  where
    E: StdError + Send + Sync + 'static,
  {
    match domain_error(&e) {
      Some(mapped) => mapped,
      None => ApiError::Store(Box::new(e)),
    }
  }
}

fn domain_error(e: &(dyn StdError + 'static)) -> Option<ApiError> {
  use academia_core::Error as Core;

  let mut current = Some(e);
  while let Some(err) = current {
    if let Some(core) = err.downcast_ref::<Core>() {
      return match core {
        Core::DuplicateRut(_) | Core::DuplicateEmail(_) => {
          Some(ApiError::Conflict(core.to_string()))
        }
        Core::InvalidRut(_) | Core::UnknownPartition(_) => {
          Some(ApiError::BadRequest(core.to_string()))
        }
      };
    }
    current = err.source();
  }
  None
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store error");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
