//! Role partitions: the five disjoint account tables.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::{Error, Result};

/// The role table an account lives in.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Partition {
  Admin,
  Student,
  Professor,
  Kinesiologist,
  Nutritionist,
}

impl Partition {
  /// Order in which the login flow searches the partitions.
  pub const SEARCH_ORDER: [Partition; 5] = [
    Partition::Admin,
    Partition::Student,
    Partition::Professor,
    Partition::Kinesiologist,
    Partition::Nutritionist,
  ];

  /// Stable partition name, as reported in a login outcome's `role`.
  pub fn name(self) -> &'static str {
    match self {
      Partition::Admin => "admin",
      Partition::Student => "student",
      Partition::Professor => "professor",
      Partition::Kinesiologist => "kinesiologist",
      Partition::Nutritionist => "nutritionist",
    }
  }

  /// Storage table backing the partition.
  pub fn table_name(self) -> &'static str {
    match self {
      Partition::Admin => "admins",
      Partition::Student => "students",
      Partition::Professor => "professors",
      Partition::Kinesiologist => "kinesiologists",
      Partition::Nutritionist => "nutritionists",
    }
  }

  pub fn from_name(name: &str) -> Result<Self> {
    name
      .parse()
      .map_err(|_| Error::UnknownPartition(name.to_string()))
  }
}
