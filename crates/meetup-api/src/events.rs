//! `/events`: creator-owned events. Every route requires a token.

use std::sync::Arc;

use axum::{
  Router,
  middleware::from_fn_with_state,
  routing::{get, patch},
};
use meetup_core::{
  event::{Event, EventUpdate, NewEvent},
  repository::Repository,
};

use crate::{
  auth::authenticate,
  controller::{self, Crud},
  credentials::Credentials,
  hooks::StampCreator,
  ownership::{OwnershipGate, authorize},
};

pub trait EventRepository:
  Repository<Entity = Event, Create = NewEvent, Update = EventUpdate> + 'static
{
}

impl<T> EventRepository for T where
  T: Repository<Entity = Event, Create = NewEvent, Update = EventUpdate> + 'static
{
}

pub fn router<E: EventRepository>(repo: Arc<E>, credentials: Arc<Credentials>) -> Router {
  let authn = from_fn_with_state(credentials, authenticate);
  let owner = from_fn_with_state(OwnershipGate::new(repo.clone(), "creator"), authorize::<E>);
  let crud = Arc::new(Crud::new(repo, StampCreator));

  let authed = Router::new()
    .route(
      "/",
      get(controller::get_all::<E, StampCreator>).post(controller::create::<E, StampCreator>),
    )
    .route("/{id}", get(controller::get_by_id::<E, StampCreator>))
    .route_layer(authn.clone());

  let owned = Router::new()
    .route(
      "/{id}",
      patch(controller::update::<E, StampCreator>).delete(controller::delete::<E, StampCreator>),
    )
    .route_layer(owner)
    .route_layer(authn);

  authed.merge(owned).with_state(crud)
}
