//! Error types for `academia-core`.

use academia_rut::RutError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid RUT: {0}")]
  InvalidRut(#[from] RutError),

  #[error("RUT {0} is already registered")]
  DuplicateRut(String),

  #[error("email {0} is already registered")]
  DuplicateEmail(String),

  #[error("unknown partition: {0:?}")]
  UnknownPartition(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
