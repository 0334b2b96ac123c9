//! `GET /app/{*path}`: route authorization for client navigation.
//!
//! Answers `303 See Other` towards the login page or the caller's own landing
//! page, or `200` with the resolved role when the path may be opened.

use academia_core::routing::{LOGIN_PATH, RouteDecision, authorize_route};
use axum::{
  Json,
  extract::{Path, State},
  http::HeaderMap,
  response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde_json::json;

use crate::{AcademiaBackend, AppState, auth::optional_session, error::Error};

pub async fn app_route<S>(
  State(state): State<AppState<S>>,
  Path(path): Path<String>,
  headers: HeaderMap,
) -> Result<Response, Error>
where
  S: AcademiaBackend,
{
  let ctx = optional_session(&headers, &state).await?;
  let path = format!("/{}", path.trim_start_matches('/'));

  let response = match authorize_route(ctx.as_ref(), &path, Utc::now()) {
    RouteDecision::Allow => Json(json!({
      "path": path,
      "routing_role": ctx.map(|c| c.routing_role),
    }))
    .into_response(),
    RouteDecision::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
    RouteDecision::Redirect(landing) => Redirect::to(landing).into_response(),
  };
  Ok(response)
}
