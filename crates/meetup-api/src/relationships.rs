//! Relationship endpoints under `/users/{id}`.
//!
//! | Method   | Path | Effect |
//! |----------|------|--------|
//! | `GET`    | `/users/{id}/{collection}` | List the collection |
//! | `POST`   | `/users/{id}/{collection}/{target_id}` | Connect |
//! | `DELETE` | `/users/{id}/{collection}/{target_id}` | Disconnect |
//!
//! `{collection}` is `friends`, `saved-meets` or `joined-meets`. The route
//! shape is turned into a `(Relation, Direction)` here; the repository only
//! ever sees the resolved tuple. Every mutation answers with the updated
//! owner.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::Method,
  response::{IntoResponse, Response},
};
use meetup_core::relationship::{Direction, Relation, RelationshipRepository};
use tracing::debug;

use crate::{
  controller::{Crud, Hooks},
  error::ApiError,
};

fn relation(collection: &str) -> Result<Relation, ApiError> {
  match collection {
    "friends" => Ok(Relation::Friends),
    "saved-meets" => Ok(Relation::SavedMeets),
    "joined-meets" => Ok(Relation::JoinedMeets),
    other => Err(ApiError::BadRequest(format!("Unknown relationship collection {other:?}"))),
  }
}

/// Map a request onto the edge operation it names.
pub fn resolve(method: &Method, collection: &str) -> Result<(Relation, Direction), ApiError> {
  let direction = match *method {
    Method::POST => Direction::Connect,
    Method::DELETE => Direction::Disconnect,
    _ => {
      return Err(ApiError::BadRequest(format!(
        "{method} is not supported on a relationship"
      )));
    }
  };
  Ok((relation(collection)?, direction))
}

/// `POST|DELETE /users/{id}/{collection}/{target_id}`
pub async fn toggle<R, H>(
  State(crud): State<Arc<Crud<R, H>>>,
  method: Method,
  Path((owner_id, collection, target_id)): Path<(String, String, String)>,
) -> Result<Json<R::Entity>, ApiError>
where
  R: RelationshipRepository + 'static,
  H: Hooks<R::Entity> + 'static,
{
  let (relation, direction) = resolve(&method, &collection)?;
  debug!(owner = %owner_id, target = %target_id, relation = relation.name(), ?direction, "relationship");
  let owner = crud
    .repository()
    .set_membership(&owner_id, &target_id, relation, direction)
    .await?;
  Ok(Json(owner))
}

/// `GET /users/{id}/{collection}`
pub async fn list<R, H>(
  State(crud): State<Arc<Crud<R, H>>>,
  Path((owner_id, collection)): Path<(String, String)>,
) -> Result<Response, ApiError>
where
  R: RelationshipRepository + 'static,
  H: Hooks<R::Entity> + 'static,
{
  let repo = crud.repository();
  let relation = relation(&collection)?;
  let response = if relation.targets_meets() {
    Json(repo.get_meets(&owner_id, relation).await?).into_response()
  } else {
    Json(repo.get_friends(&owner_id).await?).into_response()
  };
  Ok(response)
}
