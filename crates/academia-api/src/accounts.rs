//! Handlers for `/accounts` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/accounts` | Optional `?partition=admin\|student\|professor\|kinesiologist\|nutritionist` |
//! | `POST`   | `/accounts` | Body: [`NewAccount`] with flattened `partition` + role fields |
//! | `GET`    | `/accounts/:id` | 404 if not found |
//! | `DELETE` | `/accounts/:id` | 204, or 404 if not found |

use std::sync::Arc;

use academia_core::{
  Partition,
  account::{Account, NewAccount},
  store::AccountDirectory,
};
use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub partition: Option<Partition>,
}

/// `GET /accounts[?partition=<name>]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Account>>, ApiError>
where
  S: AccountDirectory,
{
  let accounts = store
    .list_accounts(params.partition)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(accounts))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /accounts`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewAccount>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AccountDirectory,
{
  if body.email.trim().is_empty() || !body.email.contains('@') {
    return Err(ApiError::BadRequest(format!("invalid email {:?}", body.email)));
  }
  if body.password.is_empty() {
    return Err(ApiError::BadRequest("password must not be empty".into()));
  }

  let account = store
    .create_account(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(account)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /accounts/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Account>, ApiError>
where
  S: AccountDirectory,
{
  let account = store
    .get_account(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("account {id} not found")))?;
  Ok(Json(account))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /accounts/:id`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: AccountDirectory,
{
  if store.delete_account(id).await.map_err(ApiError::from_store)? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("account {id} not found")))
  }
}
