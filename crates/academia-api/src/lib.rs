//! JSON REST API for administrative account provisioning.
//!
//! Exposes an axum [`Router`] backed by any
//! [`academia_core::store::AccountDirectory`]. Auth, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", academia_api::api_router(store.clone()))
//! ```

pub mod accounts;
pub mod error;

use std::sync::Arc;

use academia_core::store::AccountDirectory;
use axum::{Router, routing::get};

pub use error::ApiError;

/// Build the provisioning router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: AccountDirectory + 'static,
{
  Router::new()
    .route("/accounts", get(accounts::list::<S>).post(accounts::create::<S>))
    .route(
      "/accounts/{id}",
      get(accounts::get_one::<S>).delete(accounts::delete_one::<S>),
    )
    .with_state(store)
}
