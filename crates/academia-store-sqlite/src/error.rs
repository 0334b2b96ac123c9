//! Error type for `academia-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] academia_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("password hashing failed: {0}")]
  PasswordHash(String),

  /// A session token that was never issued (or already revoked).
  #[error("session not found")]
  SessionNotFound,
}

impl From<academia_rut::RutError> for Error {
  fn from(e: academia_rut::RutError) -> Self { Error::Core(e.into()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
