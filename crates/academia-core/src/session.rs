//! Sessions, session contexts and routing-role tags.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::partition::Partition;

/// Session data issued by the identity provider on a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
  pub user_id:      Uuid,
  pub email:        String,
  /// Opaque bearer token; only its digest is ever stored.
  pub access_token: String,
  pub expires_at:   DateTime<Utc>,
}

// ─── Routing role ────────────────────────────────────────────────────────────

/// Coarse role tag used purely for route authorization.
///
/// Distinct from the partition name: the tag is what clients persist and what
/// route guards compare against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingRole {
  Admin,
  Student,
  Professor,
  Kine,
  Nutri,
  /// Fallback for unrecognised partition names.
  #[default]
  Guest,
}

impl RoutingRole {
  pub const ALL: [RoutingRole; 6] = [
    RoutingRole::Admin,
    RoutingRole::Student,
    RoutingRole::Professor,
    RoutingRole::Kine,
    RoutingRole::Nutri,
    RoutingRole::Guest,
  ];

  /// Fixed lookup from partition name to routing tag; unknown names map to
  /// [`RoutingRole::Guest`].
  pub fn from_partition_name(name: &str) -> Self {
    match name {
      "admin" => RoutingRole::Admin,
      "student" => RoutingRole::Student,
      "professor" => RoutingRole::Professor,
      "kinesiologist" => RoutingRole::Kine,
      "nutritionist" => RoutingRole::Nutri,
      _ => RoutingRole::Guest,
    }
  }

  pub fn tag(self) -> &'static str {
    match self {
      RoutingRole::Admin => "admin",
      RoutingRole::Student => "student",
      RoutingRole::Professor => "professor",
      RoutingRole::Kine => "kine",
      RoutingRole::Nutri => "nutri",
      RoutingRole::Guest => "guest",
    }
  }

  /// Default page for the role; guests land on the login screen.
  pub fn landing_path(self) -> &'static str {
    match self {
      RoutingRole::Guest => crate::routing::LOGIN_PATH,
      RoutingRole::Admin => "/admin",
      RoutingRole::Student => "/student",
      RoutingRole::Professor => "/professor",
      RoutingRole::Kine => "/kine",
      RoutingRole::Nutri => "/nutri",
    }
  }
}

impl From<Partition> for RoutingRole {
  fn from(partition: Partition) -> Self { Self::from_partition_name(partition.name()) }
}

impl std::fmt::Display for RoutingRole {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.tag())
  }
}

// ─── Session context ─────────────────────────────────────────────────────────

/// Who is signed in and which partition the login resolved them to.
///
/// Passed explicitly to route authorization instead of being read from
/// ambient client storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
  pub user_id:      Uuid,
  pub email:        String,
  pub partition:    Partition,
  pub routing_role: RoutingRole,
  pub expires_at:   DateTime<Utc>,
}

impl SessionContext {
  pub fn new(session: &AuthSession, partition: Partition) -> Self {
    Self {
      user_id: session.user_id,
      email: session.email.clone(),
      partition,
      routing_role: partition.into(),
      expires_at: session.expires_at,
    }
  }

  pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool { self.expires_at <= now }
}
