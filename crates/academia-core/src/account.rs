//! Accounts: one person record living in exactly one role partition.

use academia_rut::Rut;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::partition::Partition;

/// Role-specific fields. The variant decides the account's partition, so an
/// account can never sit in two partitions at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "partition", rename_all = "lowercase")]
pub enum Profile {
  Admin,
  Student {
    #[serde(default)]
    sport: Option<String>,
  },
  Professor {
    #[serde(default)]
    discipline: Option<String>,
  },
  Kinesiologist {
    #[serde(default)]
    license_number: Option<String>,
  },
  Nutritionist {
    #[serde(default)]
    license_number: Option<String>,
  },
}

impl Profile {
  pub fn partition(&self) -> Partition {
    match self {
      Profile::Admin => Partition::Admin,
      Profile::Student { .. } => Partition::Student,
      Profile::Professor { .. } => Partition::Professor,
      Profile::Kinesiologist { .. } => Partition::Kinesiologist,
      Profile::Nutritionist { .. } => Partition::Nutritionist,
    }
  }

  /// The single role-specific column value, if the partition has one.
  pub fn detail(&self) -> Option<&str> {
    match self {
      Profile::Admin => None,
      Profile::Student { sport } => sport.as_deref(),
      Profile::Professor { discipline } => discipline.as_deref(),
      Profile::Kinesiologist { license_number }
      | Profile::Nutritionist { license_number } => license_number.as_deref(),
    }
  }

  /// Rebuild a profile from its partition and stored detail column.
  pub fn from_parts(partition: Partition, detail: Option<String>) -> Self {
    match partition {
      Partition::Admin => Profile::Admin,
      Partition::Student => Profile::Student { sport: detail },
      Partition::Professor => Profile::Professor { discipline: detail },
      Partition::Kinesiologist => Profile::Kinesiologist { license_number: detail },
      Partition::Nutritionist => Profile::Nutritionist { license_number: detail },
    }
  }
}

/// A provisioned account. Never created by the login flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
  pub account_id: Uuid,
  pub rut:        Rut,
  pub email:      String,
  pub full_name:  String,
  pub created_at: DateTime<Utc>,
  #[serde(flatten)]
  pub profile:    Profile,
}

impl Account {
  pub fn partition(&self) -> Partition { self.profile.partition() }
}

/// Input for [`AccountDirectory::create_account`](crate::store::AccountDirectory::create_account).
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
  pub rut:       Rut,
  pub email:     String,
  pub full_name: String,
  /// Plaintext; hashed by the directory before it is stored.
  pub password:  String,
  #[serde(flatten)]
  pub profile:   Profile,
}
