//! Error type for `meetup-store-sqlite`.

use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("decode error: {0}")]
  Decode(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  fn is_constraint_violation(&self) -> bool {
    matches!(
      self,
      Error::Database(tokio_rusqlite::Error::Rusqlite(
        rusqlite::Error::SqliteFailure(failure, _)
      )) if failure.code == ErrorCode::ConstraintViolation
    )
  }
}

impl From<Error> for meetup_core::Error {
  fn from(err: Error) -> Self {
    // Duplicate usernames/emails and dangling creator ids are caller mistakes.
    if err.is_constraint_violation() {
      return meetup_core::Error::BadRequest(
        "Request violates a uniqueness or reference constraint".to_string(),
      );
    }
    meetup_core::Error::Storage(Box::new(err))
  }
}
