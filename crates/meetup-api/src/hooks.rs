//! Resource-specific [`Hooks`] for the Generic Controller.

use std::sync::Arc;

use meetup_core::{Identity, user::User};
use serde_json::{Map, Value};
use tracing::info;

use crate::{controller::Hooks, credentials::Credentials, error::ApiError};

const PASSWORD_FIELD: &str = "password";
const CREATOR_FIELD: &str = "creatorId";

// ─── Users ───────────────────────────────────────────────────────────────────

/// Replaces a plaintext password with its digest before validation.
pub struct PasswordHooks {
  credentials: Arc<Credentials>,
}

impl PasswordHooks {
  pub fn new(credentials: Arc<Credentials>) -> Self { Self { credentials } }

  async fn digest_in_place(&self, body: &mut Map<String, Value>) -> Result<(), ApiError> {
    let Some(Value::String(password)) = body.get(PASSWORD_FIELD) else {
      return Err(ApiError::NotAcceptable(
        "Password is required and must be a string".to_string(),
      ));
    };
    if password.is_empty() {
      return Err(ApiError::NotAcceptable(
        "Password is required and must be a string".to_string(),
      ));
    }
    let digest = self.credentials.hash(password).await?;
    body.insert(PASSWORD_FIELD.to_string(), Value::String(digest));
    Ok(())
  }
}

impl Hooks<User> for PasswordHooks {
  async fn before_create(
    &self,
    body: &mut Map<String, Value>,
    _identity: Option<&Identity>,
  ) -> Result<(), ApiError> {
    self.digest_in_place(body).await
  }

  async fn before_update(
    &self,
    body: &mut Map<String, Value>,
    _identity: Option<&Identity>,
  ) -> Result<(), ApiError> {
    if body.contains_key(PASSWORD_FIELD) {
      self.digest_in_place(body).await?;
    }
    Ok(())
  }

  fn after_create(&self, user: &User) {
    info!(user = %user.id, username = %user.username, "registered user");
  }
}

// ─── Creator-owned resources ─────────────────────────────────────────────────

/// Sets `creatorId` from the authenticated identity on create, and keeps
/// patches from reassigning it.
pub struct StampCreator;

impl<T: 'static> Hooks<T> for StampCreator {
  async fn before_create(
    &self,
    body: &mut Map<String, Value>,
    identity: Option<&Identity>,
  ) -> Result<(), ApiError> {
    let identity =
      identity.ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;
    body.insert(CREATOR_FIELD.to_string(), Value::String(identity.id.clone()));
    Ok(())
  }

  async fn before_update(
    &self,
    body: &mut Map<String, Value>,
    _identity: Option<&Identity>,
  ) -> Result<(), ApiError> {
    body.remove(CREATOR_FIELD);
    Ok(())
  }
}
