//! Bearer-session extractor and the admin guard for `/api`.

use academia_core::{
  session::{RoutingRole, SessionContext},
  store::SessionStore,
};
use axum::{
  extract::{FromRequestParts, Request, State},
  http::{HeaderMap, header, request::Parts},
  middleware::Next,
  response::Response,
};

use crate::{AcademiaBackend, AppState, error::Error};

/// The bearer token from an `Authorization` header, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

/// Resolve the session behind the request's bearer token, if any.
pub async fn optional_session<S>(
  headers: &HeaderMap,
  state: &AppState<S>,
) -> Result<Option<SessionContext>, Error>
where
  S: AcademiaBackend,
{
  match bearer_token(headers) {
    Some(token) => state.store.resolve_session(token).await.map_err(Error::store),
    None => Ok(None),
  }
}

/// A request carrying a live session. Rejects with 401 otherwise.
pub struct CurrentSession {
  pub token:   String,
  pub context: SessionContext,
}

impl<S> FromRequestParts<AppState<S>> for CurrentSession
where
  S: AcademiaBackend,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers).ok_or(Error::Unauthorized)?;
    let context = state
      .store
      .resolve_session(token)
      .await
      .map_err(Error::store)?
      .ok_or(Error::Unauthorized)?;
    Ok(CurrentSession { token: token.to_string(), context })
  }
}

/// Middleware admitting only sessions whose routing role is `admin`.
pub async fn require_admin<S>(
  State(state): State<AppState<S>>,
  req: Request,
  next: Next,
) -> Result<Response, Error>
where
  S: AcademiaBackend,
{
  let ctx = optional_session(req.headers(), &state)
    .await?
    .ok_or(Error::Unauthorized)?;
  if ctx.routing_role != RoutingRole::Admin {
    tracing::info!(user_id = %ctx.user_id, role = %ctx.routing_role, "non-admin refused");
    return Err(Error::Forbidden);
  }
  Ok(next.run(req).await)
}
