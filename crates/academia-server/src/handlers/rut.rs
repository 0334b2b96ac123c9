//! `GET /rut/format`: server-side twin of the live RUT input.

use academia_rut::{format_for_display, normalize};
use axum::{
  Json,
  extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::{AcademiaBackend, AppState};

#[derive(Debug, Deserialize)]
pub struct FormatParams {
  #[serde(default)]
  pub value: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormattedRut {
  pub formatted: String,
  pub compact:   String,
  pub valid:     bool,
}

/// `GET /rut/format?value=<raw>`
pub async fn format<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<FormatParams>,
) -> Json<FormattedRut>
where
  S: AcademiaBackend,
{
  Json(FormattedRut {
    formatted: format_for_display(&params.value),
    compact:   normalize(&params.value),
    valid:     state.config.rut_policy().is_valid(&params.value),
  })
}
