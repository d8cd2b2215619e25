//! Generic Controller: one CRUD implementation shared by every resource.
//!
//! A [`Crud`] owns a repository, a create schema, an update schema and a set
//! of [`Hooks`]. Request bodies flow through a fixed pipeline:
//!
//! 1. the body must be a JSON object;
//! 2. the resource's hooks derive fields (creator id, password digest);
//! 3. transport-only fields are stripped;
//! 4. the schema validates, and only the validated value reaches the
//!    repository.
//!
//! Any failure short-circuits before the repository is touched. The free
//! functions at the bottom are the axum handlers; they are generic over the
//! repository so each resource router just names its types.

use std::{future::Future, sync::Arc};

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
};
use meetup_core::{Identity, repository::Repository};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;
use validator::Validate;

use crate::{
  auth::Authenticated,
  error::ApiError,
  schema::{Schema, Validated},
};

/// Body fields that describe the request rather than the resource.
const TRANSPORT_FIELDS: &[&str] = &["payload"];

// ─── Hooks ───────────────────────────────────────────────────────────────────

/// Per-resource steps around the shared pipeline. Every method defaults to a
/// no-op.
pub trait Hooks<T>: Send + Sync {
  /// Runs on the raw create body before stripping and validation.
  fn before_create<'a>(
    &'a self,
    body: &'a mut Map<String, Value>,
    identity: Option<&'a Identity>,
  ) -> impl Future<Output = Result<(), ApiError>> + Send + 'a {
    let _ = (body, identity);
    async { Ok(()) }
  }

  /// Runs on the raw update body before stripping and validation.
  fn before_update<'a>(
    &'a self,
    body: &'a mut Map<String, Value>,
    identity: Option<&'a Identity>,
  ) -> impl Future<Output = Result<(), ApiError>> + Send + 'a {
    let _ = (body, identity);
    async { Ok(()) }
  }

  /// Runs once the repository has created `entity`.
  fn after_create(&self, entity: &T) { let _ = entity; }
}

/// Hooks for resources that need none.
pub struct NoHooks;

impl<T> Hooks<T> for NoHooks {}

// ─── Crud ────────────────────────────────────────────────────────────────────

pub struct Crud<R: Repository, H> {
  repo:          Arc<R>,
  create_schema: Box<dyn Schema<R::Create>>,
  update_schema: Box<dyn Schema<R::Update>>,
  hooks:         H,
}

impl<R, H> Crud<R, H>
where
  R: Repository,
  H: Hooks<R::Entity>,
{
  /// A controller validating with the DTOs' own serde and `validator` rules.
  pub fn new(repo: Arc<R>, hooks: H) -> Self
  where
    R::Create: DeserializeOwned + Validate,
    R::Update: DeserializeOwned + Validate,
  {
    Self::with_schemas(repo, Validated::new(), Validated::new(), hooks)
  }

  pub fn with_schemas(
    repo: Arc<R>,
    create_schema: impl Schema<R::Create> + 'static,
    update_schema: impl Schema<R::Update> + 'static,
    hooks: H,
  ) -> Self {
    Self {
      repo,
      create_schema: Box::new(create_schema),
      update_schema: Box::new(update_schema),
      hooks,
    }
  }

  pub fn repository(&self) -> &Arc<R> { &self.repo }

  pub async fn get_all(&self) -> Result<Vec<R::Entity>, ApiError> {
    debug!("read all");
    Ok(self.repo.read_all().await?)
  }

  pub async fn get_by_id(&self, id: &str) -> Result<R::Entity, ApiError> {
    debug!(%id, "read one");
    Ok(self.repo.read_by_id(id).await?)
  }

  pub async fn create(
    &self,
    identity: Option<&Identity>,
    body: Value,
  ) -> Result<R::Entity, ApiError> {
    let mut body = into_object(body)?;
    self.hooks.before_create(&mut body, identity).await?;
    strip_transport_fields(&mut body);
    let input = self
      .create_schema
      .validate(Value::Object(body))
      .map_err(ApiError::NotAcceptable)?;

    debug!("create");
    let entity = self.repo.create(input).await?;
    self.hooks.after_create(&entity);
    Ok(entity)
  }

  pub async fn update(
    &self,
    id: &str,
    identity: Option<&Identity>,
    body: Value,
  ) -> Result<R::Entity, ApiError> {
    let mut body = into_object(body)?;
    self.hooks.before_update(&mut body, identity).await?;
    strip_transport_fields(&mut body);
    let patch = self
      .update_schema
      .validate(Value::Object(body))
      .map_err(ApiError::NotAcceptable)?;

    debug!(%id, "update");
    Ok(self.repo.update(id, patch).await?)
  }

  pub async fn delete(&self, id: &str) -> Result<R::Entity, ApiError> {
    debug!(%id, "delete");
    Ok(self.repo.delete(id).await?)
  }
}

fn into_object(body: Value) -> Result<Map<String, Value>, ApiError> {
  match body {
    Value::Object(map) => Ok(map),
    _ => Err(ApiError::NotAcceptable("Request body must be a JSON object".to_string())),
  }
}

fn strip_transport_fields(body: &mut Map<String, Value>) {
  for field in TRANSPORT_FIELDS {
    body.remove(*field);
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `GET /`
pub async fn get_all<R, H>(
  State(crud): State<Arc<Crud<R, H>>>,
) -> Result<Json<Vec<R::Entity>>, ApiError>
where
  R: Repository + 'static,
  H: Hooks<R::Entity> + 'static,
{
  Ok(Json(crud.get_all().await?))
}

/// `GET /{id}`
pub async fn get_by_id<R, H>(
  State(crud): State<Arc<Crud<R, H>>>,
  Path(id): Path<String>,
) -> Result<Json<R::Entity>, ApiError>
where
  R: Repository + 'static,
  H: Hooks<R::Entity> + 'static,
{
  Ok(Json(crud.get_by_id(&id).await?))
}

/// `POST /`, answering 201 with the created resource.
pub async fn create<R, H>(
  State(crud): State<Arc<Crud<R, H>>>,
  identity: Option<Authenticated>,
  body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<R::Entity>), ApiError>
where
  R: Repository + 'static,
  H: Hooks<R::Entity> + 'static,
{
  let Json(body) = body?;
  let identity = identity.map(|Authenticated(identity)| identity);
  let entity = crud.create(identity.as_ref(), body).await?;
  Ok((StatusCode::CREATED, Json(entity)))
}

/// `PATCH /{id}`
pub async fn update<R, H>(
  State(crud): State<Arc<Crud<R, H>>>,
  Path(id): Path<String>,
  identity: Option<Authenticated>,
  body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<R::Entity>, ApiError>
where
  R: Repository + 'static,
  H: Hooks<R::Entity> + 'static,
{
  let Json(body) = body?;
  let identity = identity.map(|Authenticated(identity)| identity);
  Ok(Json(crud.update(&id, identity.as_ref(), body).await?))
}

/// `DELETE /{id}`, answering with the deleted resource.
pub async fn delete<R, H>(
  State(crud): State<Arc<Crud<R, H>>>,
  Path(id): Path<String>,
) -> Result<Json<R::Entity>, ApiError>
where
  R: Repository + 'static,
  H: Hooks<R::Entity> + 'static,
{
  Ok(Json(crud.delete(&id).await?))
}
