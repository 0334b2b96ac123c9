//! Capability traits over the record store and identity provider.
//!
//! The login flow and the HTTP layers depend on these abstractions, never on
//! a concrete backend (e.g. `academia-store-sqlite`).

use std::future::Future;

use thiserror::Error;
use uuid::Uuid;

use crate::{
  account::{Account, NewAccount},
  partition::Partition,
  session::{AuthSession, SessionContext},
};

// ─── Partition lookup ────────────────────────────────────────────────────────

/// Single-method record lookup scoped to one role partition.
pub trait PartitionLookup: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Email of the account in this partition whose RUT is `rut` (compact
  /// form), or `None`.
  fn find_account_email_by_rut<'a>(
    &'a self,
    rut: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;
}

/// Hands out a [`PartitionLookup`] per partition.
pub trait PartitionSource {
  type Lookup: PartitionLookup;

  fn lookup(&self, partition: Partition) -> Self::Lookup;
}

// ─── Backend-wide capabilities ───────────────────────────────────────────────

/// Common error type shared by the backend capabilities below.
pub trait Backend: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;
}

/// Why a sign-in did not produce a session.
#[derive(Debug, Error)]
pub enum SignInError<E: std::error::Error + 'static> {
  /// The provider refused the credentials; carries its message verbatim.
  #[error("{0}")]
  Rejected(String),

  #[error("identity provider unavailable: {0}")]
  Backend(#[source] E),
}

/// Email + password authentication.
pub trait IdentityProvider: Backend {
  fn sign_in<'a>(
    &'a self,
    email: &'a str,
    password: &'a str,
  ) -> impl Future<Output = Result<AuthSession, SignInError<Self::Error>>> + Send + 'a;
}

/// Persistence of issued sessions and the partition each login resolved.
pub trait SessionStore: Backend {
  /// Bind the partition resolved at login to an issued session.
  fn record_context<'a>(
    &'a self,
    session: &'a AuthSession,
    partition: Partition,
  ) -> impl Future<Output = Result<SessionContext, Self::Error>> + Send + 'a;

  /// Look up a live session by bearer token. Expired, revoked and unbound
  /// sessions resolve to `None`.
  fn resolve_session<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<Option<SessionContext>, Self::Error>> + Send + 'a;

  /// Returns `true` if a session was removed.
  fn revoke_session<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}

/// Administrative provisioning of accounts.
pub trait AccountDirectory: Backend {
  /// Create an account and its sign-in credential.
  ///
  /// Fails if the RUT exists in any partition or the email is taken.
  fn create_account(
    &self,
    input: NewAccount,
  ) -> impl Future<Output = Result<Account, Self::Error>> + Send + '_;

  fn get_account(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  /// List accounts, optionally restricted to one partition.
  fn list_accounts(
    &self,
    partition: Option<Partition>,
  ) -> impl Future<Output = Result<Vec<Account>, Self::Error>> + Send + '_;

  /// Remove an account with its credential and sessions. Returns `true` if
  /// it existed.
  fn delete_account(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
