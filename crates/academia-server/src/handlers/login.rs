//! `/auth/*` handlers: RUT login, logout and session introspection.

use academia_core::{
  login::{ErrorMessage, LoginError, LoginOutcome, validate_login_rut},
  session::SessionContext,
  store::SessionStore,
};
use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{AcademiaBackend, AppState, auth::CurrentSession, error::Error};

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub rut:      String,
  pub password: String,
}

fn status_for(result: &Result<impl Sized, LoginError>) -> StatusCode {
  match result {
    Ok(_) => StatusCode::OK,
    Err(LoginError::InvalidRut { .. }) => StatusCode::BAD_REQUEST,
    Err(LoginError::NotRegistered { .. }) => StatusCode::NOT_FOUND,
    Err(LoginError::InvalidCredentials(_)) => StatusCode::UNAUTHORIZED,
    Err(LoginError::Service(_)) => StatusCode::BAD_GATEWAY,
  }
}

/// `POST /auth/login`: body `{"rut": "...", "password": "..."}`.
///
/// Always answers with a [`LoginOutcome`], an unreadable body included; the
/// status code mirrors which half of it is populated.
pub async fn login<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<LoginBody>, JsonRejection>,
) -> Response
where
  S: AcademiaBackend,
{
  let body = match body {
    Ok(Json(body)) => body,
    Err(rejection) => {
      let outcome = LoginOutcome {
        data:         None,
        error:        Some(ErrorMessage { message: rejection.body_text() }),
        role:         None,
        routing_role: None,
      };
      return (rejection.status(), Json(outcome)).into_response();
    }
  };

  let result = match validate_login_rut(&body.rut, state.config.rut_policy()) {
    Ok(()) => state.auth.login(&body.rut, &body.password).await,
    Err(e) => Err(e),
  };

  // The one write a successful login makes: bind the resolved partition to
  // the issued session so later requests can authorize without searching.
  let result = match result {
    Ok(signed_in) => state
      .store
      .record_context(&signed_in.session, signed_in.partition)
      .await
      .map(|_| signed_in)
      .map_err(|e| LoginError::Service(e.to_string())),
    Err(e) => Err(e),
  };

  let status = status_for(&result);
  (status, Json(LoginOutcome::from(result))).into_response()
}

/// `POST /auth/logout`: revokes the bearer session.
pub async fn logout<S>(
  State(state): State<AppState<S>>,
  session: CurrentSession,
) -> Result<StatusCode, Error>
where
  S: AcademiaBackend,
{
  state
    .store
    .revoke_session(&session.token)
    .await
    .map_err(Error::store)?;
  tracing::info!(user_id = %session.context.user_id, "logged out");
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /auth/session`: the caller's [`SessionContext`].
pub async fn session(session: CurrentSession) -> Json<SessionContext> { Json(session.context) }
