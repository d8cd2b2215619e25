//! Authorization Gate: "the caller owns the resource named in the path".
//!
//! The gate is generic over the repository and over the field that names the
//! owner, so the same code guards users (`id`), meets and events (`creator`).
//! It always reloads the resource; nothing about ownership is cached or taken
//! from the request body.

use std::{collections::HashMap, sync::Arc};

use axum::{
  extract::{Path, Request, State},
  middleware::Next,
  response::Response,
};
use meetup_core::{Identity, repository::Repository};
use serde_json::Value;
use tracing::warn;

use crate::{auth::Authenticated, error::ApiError};

/// Route parameter holding the id of the guarded resource.
const ID_PARAM: &str = "id";

pub struct OwnershipGate<R> {
  repo:  Arc<R>,
  field: &'static str,
}

impl<R> Clone for OwnershipGate<R> {
  fn clone(&self) -> Self { Self { repo: self.repo.clone(), field: self.field } }
}

impl<R: Repository> OwnershipGate<R> {
  pub fn new(repo: Arc<R>, field: &'static str) -> Self { Self { repo, field } }

  /// Allow iff `identity` owns resource `id` as it is stored right now.
  pub async fn check(&self, identity: &Identity, id: &str) -> Result<(), ApiError> {
    let resource = self.repo.read_by_id(id).await?;
    let resource = serde_json::to_value(&resource).map_err(|e| ApiError::Internal(Box::new(e)))?;
    let owner = owner_id(&resource, self.field)?;

    if owner != identity.id {
      warn!(user = %identity.id, resource = %id, owner = %owner, "ownership check failed");
      return Err(ApiError::Forbidden(
        "You are not allowed to modify this resource".to_string(),
      ));
    }
    Ok(())
  }
}

/// Read the owner id out of `field` on a serialized resource.
///
/// Supported shapes are a bare string id (`"creator": "u1"`) and an embedded
/// object carrying one (`"creator": {"id": "u1", ...}`). Anything else is a
/// server bug and fails as such.
pub fn owner_id<'v>(resource: &'v Value, field: &str) -> Result<&'v str, ApiError> {
  match resource.get(field) {
    Some(Value::String(id)) => Ok(id),
    Some(Value::Object(nested)) => match nested.get("id") {
      Some(Value::String(id)) => Ok(id),
      _ => Err(ApiError::internal(format!("ownership field {field:?} has no string id"))),
    },
    Some(_) => Err(ApiError::internal(format!(
      "ownership field {field:?} is neither an id nor an object with an id"
    ))),
    None => Err(ApiError::internal(format!("resource has no ownership field {field:?}"))),
  }
}

/// Route middleware. Must sit inside [`crate::auth::authenticate`].
pub async fn authorize<R: Repository + 'static>(
  State(gate): State<OwnershipGate<R>>,
  Path(params): Path<HashMap<String, String>>,
  Authenticated(identity): Authenticated,
  req: Request,
  next: Next,
) -> Result<Response, ApiError> {
  let id = params
    .get(ID_PARAM)
    .ok_or_else(|| ApiError::internal("ownership gate mounted on a route without an id"))?;
  gate.check(&identity, id).await?;
  Ok(next.run(req).await)
}
