//! [`SqliteStore`]: the shared connection behind every repository.

use std::path::Path;

use tracing::debug;

use crate::{EventsRepo, MeetsRepo, Result, UsersRepo, schema::SCHEMA};

/// A meetup store backed by a single SQLite file.
///
/// Cloning shares the inner reference-counted connection. Each
/// repository handed out shares it.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    debug!("sqlite schema initialised");
    Ok(())
  }

  pub fn users(&self) -> UsersRepo { UsersRepo::new(self.conn.clone()) }

  pub fn meets(&self) -> MeetsRepo { MeetsRepo::new(self.conn.clone()) }

  pub fn events(&self) -> EventsRepo { EventsRepo::new(self.conn.clone()) }
}
