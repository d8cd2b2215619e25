//! `/users`: registration, login, profile CRUD and relationships.

use std::sync::Arc;

use axum::{
  Json, Router,
  extract::{FromRef, Query, State, rejection::JsonRejection},
  middleware::from_fn_with_state,
  routing::{any, get, patch, post},
};
use meetup_core::{
  Error as CoreError, Identity,
  relationship::RelationshipRepository,
  repository::{LoginKey, LoginRepository, Repository, SearchRepository},
  user::{NewUser, User, UserUpdate},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::{
  auth::authenticate,
  controller::{self, Crud},
  credentials::Credentials,
  error::ApiError,
  hooks::PasswordHooks,
  ownership::{OwnershipGate, authorize},
  relationships,
};

const LOGIN_REQUIRED: &str = "Email/username and password are required";
const LOGIN_INVALID: &str = "Email/username and password invalid";

/// Everything the users router needs from its repository.
pub trait UserRepository:
  Repository<Entity = User, Create = NewUser, Update = UserUpdate>
  + LoginRepository
  + SearchRepository
  + RelationshipRepository
  + 'static
{
}

impl<T> UserRepository for T where
  T: Repository<Entity = User, Create = NewUser, Update = UserUpdate>
    + LoginRepository
    + SearchRepository
    + RelationshipRepository
    + 'static
{
}

pub type UsersCrud<U> = Crud<U, PasswordHooks>;

pub struct UsersState<U: UserRepository> {
  pub crud:        Arc<UsersCrud<U>>,
  pub credentials: Arc<Credentials>,
}

impl<U: UserRepository> UsersState<U> {
  pub fn new(repo: Arc<U>, credentials: Arc<Credentials>) -> Self {
    let crud = Crud::new(repo, PasswordHooks::new(credentials.clone()));
    Self { crud: Arc::new(crud), credentials }
  }
}

impl<U: UserRepository> Clone for UsersState<U> {
  fn clone(&self) -> Self {
    Self { crud: self.crud.clone(), credentials: self.credentials.clone() }
  }
}

impl<U: UserRepository> FromRef<UsersState<U>> for Arc<UsersCrud<U>> {
  fn from_ref(state: &UsersState<U>) -> Self { state.crud.clone() }
}

impl<U: UserRepository> FromRef<UsersState<U>> for Arc<Credentials> {
  fn from_ref(state: &UsersState<U>) -> Self { state.credentials.clone() }
}

pub fn router<U: UserRepository>(state: UsersState<U>) -> Router {
  let authn = from_fn_with_state(state.credentials.clone(), authenticate);
  let owner = from_fn_with_state(
    OwnershipGate::new(state.crud.repository().clone(), "id"),
    authorize::<U>,
  );

  let public = Router::new()
    .route("/", get(list::<U>).post(controller::create::<U, PasswordHooks>))
    .route("/search", get(search::<U>))
    .route("/login", post(login::<U>));

  let authed = Router::new()
    .route("/{id}", get(controller::get_by_id::<U, PasswordHooks>))
    .route("/{id}/{collection}", get(relationships::list::<U, PasswordHooks>))
    .route_layer(authn.clone());

  let owned = Router::new()
    .route(
      "/{id}",
      patch(controller::update::<U, PasswordHooks>)
        .delete(controller::delete::<U, PasswordHooks>),
    )
    .route("/{id}/{collection}/{target_id}", any(relationships::toggle::<U, PasswordHooks>))
    .route_layer(owner)
    .route_layer(authn);

  public.merge(authed).merge(owned).with_state(state)
}

// ─── Lookup ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UsernameQuery {
  pub username: Option<String>,
}

/// `GET /users[?username=<term>]`
pub async fn list<U: UserRepository>(
  State(crud): State<Arc<UsersCrud<U>>>,
  Query(query): Query<UsernameQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
  let users = match query.username {
    Some(term) => crud.repository().search(&term).await?,
    None => crud.get_all().await?,
  };
  Ok(Json(users))
}

/// `GET /users/search?username=<term>`
pub async fn search<U: UserRepository>(
  State(crud): State<Arc<UsersCrud<U>>>,
  Query(query): Query<UsernameQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
  let term = query
    .username
    .ok_or_else(|| ApiError::BadRequest("Username parameter is missing".to_string()))?;
  Ok(Json(crud.repository().search(&term).await?))
}

// ─── Login ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct TokenResponse {
  pub token: String,
}

/// `POST /users/login` with `{"email"|"username": …, "password": …}`.
///
/// Unknown accounts and wrong passwords produce the same 401.
pub async fn login<U: UserRepository>(
  State(crud): State<Arc<UsersCrud<U>>>,
  State(credentials): State<Arc<Credentials>>,
  body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
  let Json(body) = body?;
  let text = |field: &str| body.get(field).and_then(Value::as_str).filter(|v| !v.is_empty());
  let password = text("password");
  let lookup = [LoginKey::Email, LoginKey::Username]
    .into_iter()
    .find_map(|key| text(key.as_str()).map(|v| (key, v)));

  let (Some(password), Some((key, value))) = (password, lookup) else {
    return Err(ApiError::BadRequest(LOGIN_REQUIRED.to_string()));
  };

  let record = match crud.repository().search_for_login(key, value).await {
    Ok(record) => record,
    Err(CoreError::BadRequest(_)) => {
      warn!(key = key.as_str(), "login for unknown account");
      return Err(ApiError::Unauthorized(LOGIN_INVALID.to_string()));
    }
    Err(e) => return Err(e.into()),
  };

  if !credentials.compare(password, &record.password).await? {
    warn!(user = %record.id, "login with wrong password");
    return Err(ApiError::Unauthorized(LOGIN_INVALID.to_string()));
  }

  let token = credentials.sign_token(&Identity { id: record.id.clone(), role: record.role })?;
  info!(user = %record.id, "logged in");
  Ok(Json(TokenResponse { token }))
}
