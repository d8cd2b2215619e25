//! `/meets`: creator-owned meets with title search.

use std::sync::Arc;

use axum::{
  Json, Router,
  extract::{Query, State},
  middleware::from_fn_with_state,
  routing::{get, patch, post},
};
use meetup_core::{
  meet::{Meet, MeetUpdate, NewMeet},
  repository::{Repository, SearchRepository},
};
use serde::Deserialize;

use crate::{
  auth::authenticate,
  controller::{self, Crud},
  credentials::Credentials,
  error::ApiError,
  hooks::StampCreator,
  ownership::{OwnershipGate, authorize},
};

pub trait MeetRepository:
  Repository<Entity = Meet, Create = NewMeet, Update = MeetUpdate> + SearchRepository + 'static
{
}

impl<T> MeetRepository for T where
  T: Repository<Entity = Meet, Create = NewMeet, Update = MeetUpdate> + SearchRepository + 'static
{
}

pub type MeetsCrud<M> = Crud<M, StampCreator>;

pub fn router<M: MeetRepository>(repo: Arc<M>, credentials: Arc<Credentials>) -> Router {
  let authn = from_fn_with_state(credentials, authenticate);
  let owner = from_fn_with_state(OwnershipGate::new(repo.clone(), "creator"), authorize::<M>);
  let crud = Arc::new(Crud::new(repo, StampCreator));

  let public = Router::new()
    .route("/", get(list::<M>))
    .route("/search", get(search::<M>));

  let authed = Router::new()
    .route("/", post(controller::create::<M, StampCreator>))
    .route("/{id}", get(controller::get_by_id::<M, StampCreator>))
    .route_layer(authn.clone());

  let owned = Router::new()
    .route(
      "/{id}",
      patch(controller::update::<M, StampCreator>).delete(controller::delete::<M, StampCreator>),
    )
    .route_layer(owner)
    .route_layer(authn);

  public.merge(authed).merge(owned).with_state(crud)
}

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
  pub title: Option<String>,
}

/// `GET /meets[?title=<term>]`
pub async fn list<M: MeetRepository>(
  State(crud): State<Arc<MeetsCrud<M>>>,
  Query(query): Query<TitleQuery>,
) -> Result<Json<Vec<Meet>>, ApiError> {
  let meets = match query.title {
    Some(term) => crud.repository().search(&term).await?,
    None => crud.get_all().await?,
  };
  Ok(Json(meets))
}

/// `GET /meets/search?title=<term>`
pub async fn search<M: MeetRepository>(
  State(crud): State<Arc<MeetsCrud<M>>>,
  Query(query): Query<TitleQuery>,
) -> Result<Json<Vec<Meet>>, ApiError> {
  let term = query
    .title
    .ok_or_else(|| ApiError::BadRequest("Title parameter is missing".to_string()))?;
  Ok(Json(crud.repository().search(&term).await?))
}
