//! Async HTTP client for the Academia server's `/auth` endpoints.

use std::time::Duration;

use academia_core::{login::LoginOutcome, session::SessionContext};
use anyhow::{Context, Result, anyhow};
use reqwest::{Client, StatusCode};
use serde_json::json;

/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
}

impl ApiClient {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, base_url: base_url.into() })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url.trim_end_matches('/'), path)
  }

  /// `POST /auth/login`
  ///
  /// Every login answer carries a [`LoginOutcome`], failures included, so
  /// the status code is only consulted when the body cannot be read.
  pub async fn login(&self, rut: &str, password: &str) -> Result<LoginOutcome> {
    let resp = self
      .client
      .post(self.url("/auth/login"))
      .json(&json!({ "rut": rut, "password": password }))
      .send()
      .await
      .context("POST /auth/login failed")?;

    let status = resp.status();
    resp
      .json()
      .await
      .map_err(|e| anyhow!("POST /auth/login → {status}: {e}"))
  }

  /// `GET /auth/session`: `None` once the token is no longer live.
  pub async fn session(&self, token: &str) -> Result<Option<SessionContext>> {
    let resp = self
      .client
      .get(self.url("/auth/session"))
      .bearer_auth(token)
      .send()
      .await
      .context("GET /auth/session failed")?;

    match resp.status() {
      StatusCode::UNAUTHORIZED => Ok(None),
      s if s.is_success() => resp.json().await.map(Some).context("deserialising session"),
      s => Err(anyhow!("GET /auth/session → {s}")),
    }
  }

  /// `POST /auth/logout`
  pub async fn logout(&self, token: &str) -> Result<()> {
    let resp = self
      .client
      .post(self.url("/auth/logout"))
      .bearer_auth(token)
      .send()
      .await
      .context("POST /auth/logout failed")?;

    match resp.status() {
      s if s.is_success() || s == StatusCode::UNAUTHORIZED => Ok(()),
      s => Err(anyhow!("POST /auth/logout → {s}")),
    }
  }
}
