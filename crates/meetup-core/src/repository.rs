//! The Resource Contract: the CRUD surface every repository exposes, plus the
//! opt-in extensions only some resources implement.
//!
//! Implemented by storage backends (e.g. `meetup-store-sqlite`). The REST
//! layer depends on these traits, never on a concrete backend.

use std::future::Future;

use serde::Serialize;

use crate::{Error, Result, user::LoginRecord};

// ─── Core contract ───────────────────────────────────────────────────────────

/// Minimal CRUD over one resource type.
///
/// Ids are strings assigned by the persistence layer. `read_by_id`, `update`
/// and `delete` fail with [`Error::NotFound`] when the id does not resolve;
/// `update` and `delete` re-check existence before mutating anything.
///
/// All methods return `Send` futures so implementations can be shared across
/// a multi-threaded runtime.
pub trait Repository: Send + Sync {
  type Entity: Serialize + Send + Sync + 'static;
  type Create: Send + 'static;
  type Update: Send + 'static;

  fn read_all(
    &self,
  ) -> impl Future<Output = Result<Vec<Self::Entity>>> + Send + '_;

  fn read_by_id<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Self::Entity>> + Send + 'a;

  fn create(
    &self,
    input: Self::Create,
  ) -> impl Future<Output = Result<Self::Entity>> + Send + '_;

  fn update<'a>(
    &'a self,
    id: &'a str,
    patch: Self::Update,
  ) -> impl Future<Output = Result<Self::Entity>> + Send + 'a;

  fn delete<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Self::Entity>> + Send + 'a;
}

// ─── Extensions ──────────────────────────────────────────────────────────────

/// The fields a login lookup may search by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginKey {
  Email,
  Username,
}

impl LoginKey {
  pub fn as_str(self) -> &'static str {
    match self {
      LoginKey::Email => "email",
      LoginKey::Username => "username",
    }
  }
}

impl std::str::FromStr for LoginKey {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "email" => Ok(LoginKey::Email),
      "username" => Ok(LoginKey::Username),
      _ => Err(Error::BadRequest("Invalid query parameters".to_string())),
    }
  }
}

/// Resources that can be logged into.
pub trait LoginRepository: Repository {
  /// Find the credential-bearing projection of the entity whose `key` equals
  /// `value`.
  ///
  /// A miss is reported as [`Error::BadRequest`], not `NotFound`, so the
  /// caller cannot probe which accounts exist.
  fn search_for_login<'a>(
    &'a self,
    key: LoginKey,
    value: &'a str,
  ) -> impl Future<Output = Result<LoginRecord>> + Send + 'a;
}

/// Resources with a free-text lookup (usernames, meet titles).
pub trait SearchRepository: Repository {
  /// Case-insensitive substring match. An empty result is not an error.
  fn search<'a>(
    &'a self,
    term: &'a str,
  ) -> impl Future<Output = Result<Vec<Self::Entity>>> + Send + 'a;
}
