//! JSON REST API for the meetup backend.
//!
//! Exposes an axum [`Router`] over any set of repositories implementing the
//! `meetup-core` contracts. Requests pass through up to three stages:
//! authentication ([`auth`]), ownership ([`ownership`]) and the shared CRUD
//! pipeline ([`controller`]). Every failure is an [`ApiError`] rendered in
//! one place.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = meetup_api::router(AppState {
//!   users:       Arc::new(store.users()),
//!   meets:       Arc::new(store.meets()),
//!   events:      Arc::new(store.events()),
//!   credentials: Arc::new(Credentials::new(&secret, ttl)),
//! });
//! ```

pub mod auth;
pub mod controller;
pub mod credentials;
pub mod error;
pub mod events;
pub mod hooks;
pub mod meets;
pub mod ownership;
pub mod relationships;
pub mod schema;
pub mod users;

#[cfg(test)]
mod testing;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, http::Uri};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

pub use credentials::Credentials;
pub use error::ApiError;
use events::EventRepository;
use meets::MeetRepository;
use users::{UserRepository, UsersState};

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
  #[default]
  Production,
  Development,
}

/// Runtime server configuration, deserialised from `config.toml` and
/// `MEETUP_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:           String,
  pub port:           u16,
  pub database_path:  PathBuf,
  pub jwt_secret:     String,
  pub token_ttl_secs: i64,
  #[serde(default)]
  pub environment:    Environment,
}

impl ServerConfig {
  pub fn token_ttl(&self) -> chrono::Duration { chrono::Duration::seconds(self.token_ttl_secs) }
}

// ─── Application state ───────────────────────────────────────────────────────

pub struct AppState<U, M, E> {
  pub users:       Arc<U>,
  pub meets:       Arc<M>,
  pub events:      Arc<E>,
  pub credentials: Arc<Credentials>,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full API router.
pub fn router<U, M, E>(state: AppState<U, M, E>) -> Router
where
  U: UserRepository,
  M: MeetRepository,
  E: EventRepository,
{
  let users_state = UsersState::new(state.users, state.credentials.clone());

  Router::new()
    .nest("/users", users::router(users_state))
    .nest("/meets", meets::router(state.meets, state.credentials.clone()))
    .nest("/events", events::router(state.events, state.credentials))
    .fallback(no_route)
    .layer(TraceLayer::new_for_http())
}

async fn no_route(uri: Uri) -> ApiError { ApiError::NotFound(format!("No route for {}", uri.path())) }
