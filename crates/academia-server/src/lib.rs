//! HTTP surface for Academia.
//!
//! Exposes an axum [`Router`] with the RUT login flow, session endpoints, a
//! route guard for client navigation and the admin-only provisioning API,
//! backed by any store implementing the [`academia_core::store`] capabilities.

pub mod auth;
pub mod error;
pub mod handlers;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use academia_core::{
  login::Authenticator,
  store::{AccountDirectory, IdentityProvider, PartitionSource, SessionStore},
};
use academia_rut::RutPolicy;
use axum::{
  Router,
  middleware::from_fn_with_state,
  routing::{get, post},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use handlers::{guard, login, rut};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ACADEMIA_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                    String,
  pub port:                    u16,
  pub store_path:              PathBuf,
  pub session_ttl_minutes:     i64,
  /// Accept the legacy `11` value as a valid RUT.
  pub allow_legacy_rut_bypass: bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                    "127.0.0.1".to_string(),
      port:                    8080,
      store_path:              PathBuf::from("academia.db"),
      session_ttl_minutes:     12 * 60,
      allow_legacy_rut_bypass: true,
    }
  }
}

impl ServerConfig {
  pub fn rut_policy(&self) -> RutPolicy {
    RutPolicy { allow_legacy_bypass: self.allow_legacy_rut_bypass }
  }

  pub fn session_ttl(&self) -> chrono::Duration {
    chrono::Duration::minutes(self.session_ttl_minutes)
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Every capability the server needs from one backend.
pub trait AcademiaBackend:
  IdentityProvider
  + SessionStore
  + AccountDirectory
  + PartitionSource<Lookup: 'static>
  + Clone
  + Send
  + Sync
  + 'static
{
}

impl<T> AcademiaBackend for T where
  T: IdentityProvider
    + SessionStore
    + AccountDirectory
    + PartitionSource<Lookup: 'static>
    + Clone
    + Send
    + Sync
    + 'static
{
}

/// Shared state threaded through all axum handlers.
pub struct AppState<S: AcademiaBackend> {
  pub store:  Arc<S>,
  pub auth:   Arc<Authenticator<S::Lookup, S>>,
  pub config: Arc<ServerConfig>,
}

impl<S: AcademiaBackend> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      auth:   Arc::clone(&self.auth),
      config: Arc::clone(&self.config),
    }
  }
}

impl<S: AcademiaBackend> AppState<S> {
  /// Wire an authenticator over all five partitions of `store`.
  pub fn new(store: S, config: ServerConfig) -> Self {
    let auth = Authenticator::for_all_partitions(&store, store.clone());
    Self {
      store:  Arc::new(store),
      auth:   Arc::new(auth),
      config: Arc::new(config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full axum [`Router`].
pub fn router<S: AcademiaBackend>(state: AppState<S>) -> Router {
  let api = academia_api::api_router(state.store.clone())
    .layer(from_fn_with_state(state.clone(), auth::require_admin::<S>));

  Router::new()
    .route("/auth/login",   post(login::login::<S>))
    .route("/auth/logout",  post(login::logout::<S>))
    .route("/auth/session", get(login::session))
    .route("/rut/format",   get(rut::format::<S>))
    .route("/app/{*path}",  get(guard::app_route::<S>))
    .with_state(state)
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use academia_core::{
    account::{NewAccount, Profile},
    login::LoginOutcome,
    session::{RoutingRole, SessionContext},
  };
  use academia_rut::Rut;
  use academia_store_sqlite::SqliteStore;
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use serde_json::{Value, json};
  use tower::ServiceExt;

  use super::*;
  use crate::handlers::rut::FormattedRut;

  const PASSWORD: &str = "correct horse";

  fn account(rut: &str, email: &str, profile: Profile) -> NewAccount {
    NewAccount {
      rut:       Rut::parse(rut).unwrap(),
      email:     email.to_string(),
      full_name: "Test Person".to_string(),
      password:  PASSWORD.to_string(),
      profile,
    }
  }

  async fn state_with(config: ServerConfig) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory()
      .await
      .unwrap()
      .with_rut_policy(config.rut_policy());
    store
      .create_account(account("12.345.678-5", "p@x.com", Profile::Professor { discipline: None }))
      .await
      .unwrap();
    store
      .create_account(account("7.654.321-6", "admin@x.com", Profile::Admin))
      .await
      .unwrap();
    AppState::new(store, config)
  }

  async fn state() -> AppState<SqliteStore> { state_with(ServerConfig::default()).await }

  async fn send(app: Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    (status, body.to_vec())
  }

  fn login_request(rut: &str, password: &str) -> Request<Body> {
    Request::builder()
      .method("POST")
      .uri("/auth/login")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(json!({ "rut": rut, "password": password }).to_string()))
      .unwrap()
  }

  async fn login_token(state: &AppState<SqliteStore>, rut: &str) -> String {
    let (status, body) = send(router(state.clone()), login_request(rut, PASSWORD)).await;
    assert_eq!(status, StatusCode::OK);
    let outcome: LoginOutcome = serde_json::from_slice(&body).unwrap();
    outcome.data.unwrap().access_token
  }

  fn get_with_token(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(t) = token {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    builder.body(Body::empty()).unwrap()
  }

  // ─── Login ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn login_success_resolves_partition() {
    let (status, body) =
      send(router(state().await), login_request("12.345.678-5", PASSWORD)).await;
    assert_eq!(status, StatusCode::OK);

    let outcome: LoginOutcome = serde_json::from_slice(&body).unwrap();
    assert!(outcome.error.is_none());
    assert_eq!(outcome.role.map(|p| p.name()), Some("professor"));
    assert_eq!(outcome.routing_role, Some(RoutingRole::Professor));
    assert_eq!(outcome.data.unwrap().email, "p@x.com");
  }

  #[tokio::test]
  async fn login_wrong_password_is_401_with_provider_message() {
    let (status, body) =
      send(router(state().await), login_request("12345678-5", "wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let outcome: LoginOutcome = serde_json::from_slice(&body).unwrap();
    assert!(outcome.data.is_none());
    assert!(outcome.role.is_none());
    assert_eq!(outcome.error.unwrap().message, "Invalid login credentials");
  }

  #[tokio::test]
  async fn login_unregistered_rut_is_404() {
    let (status, body) =
      send(router(state().await), login_request("24.965.885-5", PASSWORD)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let outcome: LoginOutcome = serde_json::from_slice(&body).unwrap();
    assert_eq!(
      outcome.error.unwrap().message,
      "El RUT 24.965.885-5 no está registrado en el sistema."
    );
  }

  #[tokio::test]
  async fn login_invalid_rut_is_400() {
    let (status, body) =
      send(router(state().await), login_request("12.345.678-9", PASSWORD)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let outcome: LoginOutcome = serde_json::from_slice(&body).unwrap();
    assert!(outcome.data.is_none());
    assert!(outcome.error.is_some());
  }

  #[tokio::test]
  async fn legacy_bypass_follows_config() {
    // Passes validation, but nobody is registered under it.
    let (status, _) = send(router(state().await), login_request("11", PASSWORD)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let strict = ServerConfig { allow_legacy_rut_bypass: false, ..Default::default() };
    let (status, _) =
      send(router(state_with(strict).await), login_request("11", PASSWORD)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ─── Session ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn session_then_logout() {
    let state = state().await;
    let token = login_token(&state, "12.345.678-5").await;

    let (status, body) =
      send(router(state.clone()), get_with_token("/auth/session", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let ctx: SessionContext = serde_json::from_slice(&body).unwrap();
    assert_eq!(ctx.routing_role, RoutingRole::Professor);
    assert_eq!(ctx.email, "p@x.com");

    let logout = Request::builder()
      .method("POST")
      .uri("/auth/logout")
      .header(header::AUTHORIZATION, format!("Bearer {token}"))
      .body(Body::empty())
      .unwrap();
    let (status, _) = send(router(state.clone()), logout).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) =
      send(router(state), get_with_token("/auth/session", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn session_without_token_is_401() {
    let resp = router(state().await)
      .oneshot(get_with_token("/auth/session", None))
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
  }

  // ─── Route guard ────────────────────────────────────────────────────────────

  fn location(resp: &axum::response::Response) -> Option<&str> {
    resp.headers().get(header::LOCATION).and_then(|v| v.to_str().ok())
  }

  #[tokio::test]
  async fn guard_redirects_anonymous_to_login() {
    let resp = router(state().await)
      .oneshot(get_with_token("/app/professor/classes", None))
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/login"));
  }

  #[tokio::test]
  async fn guard_sends_other_roles_to_their_landing() {
    let state = state().await;
    let token = login_token(&state, "12.345.678-5").await;

    let resp = router(state.clone())
      .oneshot(get_with_token("/app/admin/users", Some(&token)))
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/professor"));

    let (status, body) =
      send(router(state), get_with_token("/app/professor/classes", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let v: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["path"], "/professor/classes");
    assert_eq!(v["routing_role"], "professor");
  }

  #[tokio::test]
  async fn guard_allows_login_page_anonymously() {
    let resp = router(state().await)
      .oneshot(get_with_token("/app/login", None))
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
  }

  // ─── Provisioning API ───────────────────────────────────────────────────────

  fn create_student(token: &str) -> Request<Body> {
    Request::builder()
      .method("POST")
      .uri("/api/accounts")
      .header(header::CONTENT_TYPE, "application/json")
      .header(header::AUTHORIZATION, format!("Bearer {token}"))
      .body(Body::from(
        json!({
          "rut": "11.000.009-K",
          "email": "s@x.com",
          "full_name": "Student",
          "password": "pw",
          "partition": "student",
          "sport": "swimming",
        })
        .to_string(),
      ))
      .unwrap()
  }

  #[tokio::test]
  async fn admin_can_provision_accounts() {
    let state = state().await;
    let token = login_token(&state, "7.654.321-6").await;

    let (status, body) = send(router(state.clone()), create_student(&token)).await;
    assert_eq!(status, StatusCode::CREATED);
    let v: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["partition"], "student");
    assert_eq!(v["sport"], "swimming");

    // The new student can log in straight away.
    let (status, body) = send(router(state), login_request("11000009-k", "pw")).await;
    assert_eq!(status, StatusCode::OK);
    let outcome: LoginOutcome = serde_json::from_slice(&body).unwrap();
    assert_eq!(outcome.routing_role, Some(RoutingRole::Student));
  }

  #[tokio::test]
  async fn api_rejects_non_admin_and_anonymous() {
    let state = state().await;
    let token = login_token(&state, "12.345.678-5").await;

    let (status, _) = send(router(state.clone()), create_student(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(router(state), get_with_token("/api/accounts", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn admin_lists_and_deletes_accounts() {
    let state = state().await;
    let token = login_token(&state, "7.654.321-6").await;

    let (status, body) = send(
      router(state.clone()),
      get_with_token("/api/accounts?partition=professor", Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let list: Vec<Value> = serde_json::from_slice(&body).unwrap();
    assert_eq!(list.len(), 1);
    let id = list[0]["account_id"].as_str().unwrap().to_string();

    let delete = |id: &str| {
      Request::builder()
        .method("DELETE")
        .uri(format!("/api/accounts/{id}"))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
    };
    let (status, _) = send(router(state.clone()), delete(&id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(router(state.clone()), delete(&id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Their credential went with them.
    let (status, _) = send(router(state), login_request("12.345.678-5", PASSWORD)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn duplicate_rut_is_a_conflict() {
    let state = state().await;
    let token = login_token(&state, "7.654.321-6").await;

    let (status, _) = send(router(state.clone()), create_student(&token)).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(router(state), create_student(&token)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let v: Value = serde_json::from_slice(&body).unwrap();
    assert!(v["error"].is_string());
  }

  // ─── RUT helper ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn unreadable_login_body_still_answers_with_outcome() {
    let req = Request::builder()
      .method("POST")
      .uri("/auth/login")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from("{\"rut\": "))
      .unwrap();
    let (status, body) = send(router(state().await), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let outcome: LoginOutcome = serde_json::from_slice(&body).unwrap();
    assert!(outcome.data.is_none());
    assert!(outcome.role.is_none());
    assert!(!outcome.error.unwrap().message.is_empty());
  }

  #[tokio::test]
  async fn rut_format_endpoint_with_bad_and_partial_input() {
    let (_, body) =
      send(router(state().await), get_with_token("/rut/format?value=12.345.678-9", None)).await;
    let formatted: FormattedRut = serde_json::from_slice(&body).unwrap();
    assert_eq!(formatted.formatted, "12.345.678-9");
    assert!(!formatted.valid);

    let (status, body) =
      send(router(state().await), get_with_token("/rut/format?value=1", None)).await;
    assert_eq!(status, StatusCode::OK);
    let formatted: FormattedRut = serde_json::from_slice(&body).unwrap();
    assert_eq!(
      formatted,
      FormattedRut {
        formatted: "1".to_string(),
        compact:   "1".to_string(),
        valid:     false,
      }
    );
  }

  #[tokio::test]
  async fn rut_format_endpoint() {
    let (status, body) =
      send(router(state().await), get_with_token("/rut/format?value=123456785", None)).await;
    assert_eq!(status, StatusCode::OK);
    let formatted: FormattedRut = serde_json::from_slice(&body).unwrap();
    assert_eq!(
      formatted,
      FormattedRut {
        formatted: "12.345.678-5".to_string(),
        compact:   "123456785".to_string(),
        valid:     true,
      }
    );
  }

  // ─── Unreachable record service ─────────────────────────────────────────────

  mod unavailable {
    use academia_core::{
      Partition,
      account::{Account, NewAccount},
      session::{AuthSession, SessionContext},
      store::{
        AccountDirectory, Backend, IdentityProvider, PartitionLookup, PartitionSource,
        SessionStore, SignInError,
      },
    };
    use academia_store_sqlite::{Error, SqliteStore};
    use uuid::Uuid;

    #[derive(Debug, thiserror::Error)]
    #[error("record service unavailable")]
    pub struct Unavailable;

    pub struct DownLookup;

    impl PartitionLookup for DownLookup {
      type Error = Unavailable;

      async fn find_account_email_by_rut(&self, _rut: &str) -> Result<Option<String>, Unavailable> {
        Err(Unavailable)
      }
    }

    /// A working store whose partition tables cannot be reached.
    #[derive(Clone)]
    pub struct DownStore(pub SqliteStore);

    impl PartitionSource for DownStore {
      type Lookup = DownLookup;

      fn lookup(&self, _partition: Partition) -> DownLookup { DownLookup }
    }

    impl Backend for DownStore {
      type Error = Error;
    }

    impl IdentityProvider for DownStore {
      async fn sign_in(
        &self,
        email: &str,
        password: &str,
      ) -> Result<AuthSession, SignInError<Error>> {
        self.0.sign_in(email, password).await
      }
    }

    impl SessionStore for DownStore {
      async fn record_context(
        &self,
        session: &AuthSession,
        partition: Partition,
      ) -> Result<SessionContext, Error> {
        self.0.record_context(session, partition).await
      }

      async fn resolve_session(&self, token: &str) -> Result<Option<SessionContext>, Error> {
        self.0.resolve_session(token).await
      }

      async fn revoke_session(&self, token: &str) -> Result<bool, Error> {
        self.0.revoke_session(token).await
      }
    }

    impl AccountDirectory for DownStore {
      async fn create_account(&self, input: NewAccount) -> Result<Account, Error> {
        self.0.create_account(input).await
      }

      async fn get_account(&self, id: Uuid) -> Result<Option<Account>, Error> {
        self.0.get_account(id).await
      }

      async fn list_accounts(&self, partition: Option<Partition>) -> Result<Vec<Account>, Error> {
        self.0.list_accounts(partition).await
      }

      async fn delete_account(&self, id: Uuid) -> Result<bool, Error> {
        self.0.delete_account(id).await
      }
    }
  }

  #[tokio::test]
  async fn lookup_failure_is_502_service_error() {
    let store = unavailable::DownStore(SqliteStore::open_in_memory().await.unwrap());
    let app = router(AppState::new(store, ServerConfig::default()));

    let (status, body) = send(app, login_request("12.345.678-5", PASSWORD)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let outcome: LoginOutcome = serde_json::from_slice(&body).unwrap();
    assert!(outcome.data.is_none());
    assert_eq!(outcome.error.unwrap().message, "record service unavailable");
  }
}
