//! [`EventsRepo`]: creator-owned events.

use meetup_core::{
  Error as CoreError, Result as CoreResult,
  event::{Event, EventUpdate, NewEvent},
  repository::Repository,
  user::UserSummary,
};
use rusqlite::{OptionalExtension as _, Row};
use tracing::debug;
use uuid::Uuid;

use crate::{
  Error,
  encode::{apply_update, exists, present},
};

const EVENT_SELECT: &str = "
  SELECT e.id, e.title, e.description, e.sport, e.date, e.location, e.image,
         u.id, u.username, u.email
  FROM events e
  JOIN users u ON u.id = e.creator_id";

fn event_row(row: &Row<'_>) -> rusqlite::Result<Event> {
  Ok(Event {
    id:          row.get(0)?,
    title:       row.get(1)?,
    description: row.get(2)?,
    sport:       row.get(3)?,
    date:        row.get(4)?,
    location:    row.get(5)?,
    image:       row.get(6)?,
    creator:     UserSummary {
      id:       row.get(7)?,
      username: row.get(8)?,
      email:    row.get(9)?,
    },
  })
}

fn load_event(conn: &rusqlite::Connection, id: &str) -> rusqlite::Result<Option<Event>> {
  conn
    .query_row(
      &format!("{EVENT_SELECT} WHERE e.id = ?1"),
      rusqlite::params![id],
      event_row,
    )
    .optional()
}

/// Events backed by the shared SQLite connection.
#[derive(Clone)]
pub struct EventsRepo {
  conn: tokio_rusqlite::Connection,
}

impl EventsRepo {
  pub(crate) fn new(conn: tokio_rusqlite::Connection) -> Self { Self { conn } }

  async fn require(&self, id: &str) -> CoreResult<Event> {
    let id_param = id.to_owned();
    self
      .conn
      .call(move |conn| Ok(load_event(conn, &id_param)?))
      .await
      .map_err(Error::from)?
      .ok_or_else(|| CoreError::not_found("Event", id))
  }
}

impl Repository for EventsRepo {
  type Entity = Event;
  type Create = NewEvent;
  type Update = EventUpdate;

  async fn read_all(&self) -> CoreResult<Vec<Event>> {
    let events = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!("{EVENT_SELECT} ORDER BY e.rowid"))?;
        let rows = stmt
          .query_map([], event_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::from)?;
    Ok(events)
  }

  async fn read_by_id(&self, id: &str) -> CoreResult<Event> { self.require(id).await }

  async fn create(&self, input: NewEvent) -> CoreResult<Event> {
    let id = Uuid::new_v4().to_string();
    let id_param = id.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO events (
             id, title, description, sport, date, location, image, creator_id
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_param,
            input.title,
            input.description,
            input.sport,
            input.date,
            input.location,
            input.image,
            input.creator_id,
          ],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::from)?;

    debug!(event_id = %id, "event created");
    self.require(&id).await
  }

  async fn update(&self, id: &str, patch: EventUpdate) -> CoreResult<Event> {
    let id_param = id.to_owned();
    let sets = present! {
      "title"       => patch.title,
      "creator_id"  => patch.creator_id,
      "description" => patch.description,
      "sport"       => patch.sport,
      "location"    => patch.location,
      "date"        => patch.date,
      "image"       => patch.image,
    };

    let found = self
      .conn
      .call(move |conn| {
        if !exists(conn, "events", &id_param)? {
          return Ok(false);
        }
        apply_update(conn, "events", &id_param, sets)?;
        Ok(true)
      })
      .await
      .map_err(Error::from)?;

    if !found {
      return Err(CoreError::not_found("Event", id));
    }
    self.require(id).await
  }

  async fn delete(&self, id: &str) -> CoreResult<Event> {
    let id_param = id.to_owned();
    let removed = self
      .conn
      .call(move |conn| {
        let Some(event) = load_event(conn, &id_param)? else {
          return Ok(None);
        };
        conn.execute("DELETE FROM events WHERE id = ?1", rusqlite::params![id_param])?;
        Ok(Some(event))
      })
      .await
      .map_err(Error::from)?;

    removed.ok_or_else(|| CoreError::not_found("Event", id))
  }
}
