//! Error taxonomy shared by every layer.

use thiserror::Error;

/// A failure raised by a repository or by the layers above it.
///
/// Each variant maps onto exactly one HTTP status in the REST layer.
#[derive(Debug, Error)]
pub enum Error {
  /// Malformed caller input.
  #[error("{0}")]
  BadRequest(String),

  /// A referenced id does not resolve.
  #[error("{0}")]
  NotFound(String),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("internal error: {0}")]
  Internal(String),
}

impl Error {
  pub fn not_found(entity: &str, id: &str) -> Self {
    Self::NotFound(format!("{entity} {id} not found"))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
