//! Error types for the academia-rut codec.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RutError {
  #[error("RUT is empty")]
  Empty,

  #[error("RUT {0:?} is too short")]
  TooShort(String),

  #[error("RUT body {0:?} must contain only digits")]
  InvalidBody(String),

  #[error("check digit mismatch: expected {expected}, found {found}")]
  CheckDigitMismatch { expected: char, found: char },
}

pub type Result<T, E = RutError> = std::result::Result<T, E>;
