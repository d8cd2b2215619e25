//! SQLite backend for the meetup resource repositories.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod encode;
mod events;
mod meets;
mod schema;
mod store;
mod users;

pub mod error;

pub use error::{Error, Result};
pub use events::EventsRepo;
pub use meets::MeetsRepo;
pub use store::SqliteStore;
pub use users::UsersRepo;

#[cfg(test)]
mod tests;
