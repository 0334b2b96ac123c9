//! Role-resolving login.
//!
//! The identity provider only signs people in by email, while users log in
//! with their RUT. [`Authenticator::login`] walks an ordered list of partition
//! lookups to find the account's email, then signs in with it. The first
//! partition that knows the RUT is authoritative: a rejected password is
//! final and no further partitions are consulted.

use academia_rut::{RutPolicy, normalize};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
  partition::Partition,
  session::{AuthSession, RoutingRole},
  store::{IdentityProvider, PartitionLookup, PartitionSource, SignInError},
};

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Every way a login can fail. Returned, never panicked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
  /// Rejected by the caller before any lookup happens.
  #[error("El RUT {rut} no es válido.")]
  InvalidRut { rut: String },

  #[error("El RUT {rut} no está registrado en el sistema.")]
  NotRegistered { rut: String },

  /// Provider message, verbatim.
  #[error("{0}")]
  InvalidCredentials(String),

  #[error("{0}")]
  Service(String),
}

/// Caller-side precondition for [`Authenticator::login`].
pub fn validate_login_rut(rut: &str, policy: RutPolicy) -> Result<(), LoginError> {
  let rut = rut.trim();
  if policy.is_valid(rut) {
    Ok(())
  } else {
    Err(LoginError::InvalidRut { rut: rut.to_string() })
  }
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// A successful login: the provider's session and the partition it resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIn {
  pub session:   AuthSession,
  pub partition: Partition,
}

impl SignedIn {
  pub fn routing_role(&self) -> RoutingRole { self.partition.into() }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
  pub message: String,
}

/// Wire envelope of a login attempt.
///
/// Exactly one of `data` / `error` is set; `role` and `routing_role` are set
/// only on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginOutcome {
  pub data:         Option<AuthSession>,
  pub error:        Option<ErrorMessage>,
  pub role:         Option<Partition>,
  pub routing_role: Option<RoutingRole>,
}

impl From<Result<SignedIn, LoginError>> for LoginOutcome {
  fn from(result: Result<SignedIn, LoginError>) -> Self {
    match result {
      Ok(signed_in) => Self {
        routing_role: Some(signed_in.routing_role()),
        role:         Some(signed_in.partition),
        data:         Some(signed_in.session),
        error:        None,
      },
      Err(e) => Self {
        data:         None,
        error:        Some(ErrorMessage { message: e.to_string() }),
        role:         None,
        routing_role: None,
      },
    }
  }
}

// ─── Authenticator ───────────────────────────────────────────────────────────

/// Resolves a RUT to its partition and signs the person in.
pub struct Authenticator<L, P> {
  partitions: Vec<(Partition, L)>,
  provider:   P,
}

impl<L, P> Authenticator<L, P>
where
  L: PartitionLookup,
  P: IdentityProvider,
{
  /// An authenticator with no partitions; add them with
  /// [`with_partition`](Self::with_partition) in search order.
  pub fn new(provider: P) -> Self { Self { partitions: Vec::new(), provider } }

  pub fn with_partition(mut self, partition: Partition, lookup: L) -> Self {
    self.partitions.push((partition, lookup));
    self
  }

  /// All five partitions in [`Partition::SEARCH_ORDER`].
  pub fn for_all_partitions<S>(source: &S, provider: P) -> Self
  where
    S: PartitionSource<Lookup = L>,
  {
    Partition::SEARCH_ORDER
      .into_iter()
      .fold(Self::new(provider), |auth, p| auth.with_partition(p, source.lookup(p)))
  }

  /// Log in with a RUT and password.
  ///
  /// The caller is expected to have checked the RUT with
  /// [`validate_login_rut`]; it is not re-validated here.
  pub async fn login(&self, rut: &str, password: &str) -> Result<SignedIn, LoginError> {
    let submitted = rut.trim();
    let key = normalize(submitted);

    let Some((partition, email)) = self.find_email(&key).await? else {
      info!(rut = submitted, "login for unregistered RUT");
      return Err(LoginError::NotRegistered { rut: submitted.to_string() });
    };

    match self.provider.sign_in(&email, password).await {
      Ok(session) => {
        info!(%partition, user_id = %session.user_id, "login succeeded");
        Ok(SignedIn { session, partition })
      }
      Err(SignInError::Rejected(message)) => {
        info!(%partition, "credentials rejected");
        Err(LoginError::InvalidCredentials(message))
      }
      Err(SignInError::Backend(e)) => {
        warn!(error = %e, "identity provider failed");
        Err(LoginError::Service(e.to_string()))
      }
    }
  }

  /// Sequential first-match search over the partitions.
  async fn find_email(&self, key: &str) -> Result<Option<(Partition, String)>, LoginError> {
    for (partition, lookup) in &self.partitions {
      debug!(%partition, "searching partition");
      let found = lookup.find_account_email_by_rut(key).await.map_err(|e| {
        warn!(%partition, error = %e, "partition lookup failed");
        LoginError::Service(e.to_string())
      })?;
      if let Some(email) = found {
        return Ok(Some((*partition, email)));
      }
    }
    Ok(None)
  }
}
