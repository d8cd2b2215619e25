//! [`MeetsRepo`]: meets with their creator and attendees.

use meetup_core::{
  Error as CoreError, Result as CoreResult,
  meet::{Meet, MeetUpdate, NewMeet},
  repository::{Repository, SearchRepository},
  user::UserSummary,
};
use rusqlite::{Connection, OptionalExtension as _, Row};
use tracing::debug;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    USER_SUMMARY_COLUMNS, apply_update, contains_pattern, exists, present, query_by_id,
    user_summary,
  },
};

/// Meet columns followed by the creator's summary columns.
const MEET_SELECT: &str = "
  SELECT m.id, m.title, m.description, m.sport, m.date, m.location, m.image,
         u.id, u.username, u.email
  FROM meets m
  JOIN users u ON u.id = m.creator_id";

fn meet_row(row: &Row<'_>) -> rusqlite::Result<Meet> {
  Ok(Meet {
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
    attendees:   Vec::new(),
  })
}

fn with_attendees(conn: &Connection, mut meet: Meet) -> rusqlite::Result<Meet> {
  meet.attendees = query_by_id(
    conn,
    &format!(
      "SELECT {USER_SUMMARY_COLUMNS} FROM users u
       JOIN joined_meets j ON j.user_id = u.id
       WHERE j.meet_id = ?1 ORDER BY j.rowid"
    ),
    &meet.id,
    user_summary,
  )?;
  Ok(meet)
}

fn load_meet(conn: &Connection, id: &str) -> rusqlite::Result<Option<Meet>> {
  let meet = conn
    .query_row(
      &format!("{MEET_SELECT} WHERE m.id = ?1"),
      rusqlite::params![id],
      meet_row,
    )
    .optional()?;
  meet.map(|m| with_attendees(conn, m)).transpose()
}

fn load_meets(
  conn: &Connection,
  filter: &str,
  params: impl rusqlite::Params,
) -> rusqlite::Result<Vec<Meet>> {
  let mut stmt = conn.prepare(&format!("{MEET_SELECT} {filter}"))?;
  let meets = stmt
    .query_map(params, meet_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  meets.into_iter().map(|m| with_attendees(conn, m)).collect()
}

/// Meets backed by the shared SQLite connection.
#[derive(Clone)]
pub struct MeetsRepo {
  conn: tokio_rusqlite::Connection,
}

impl MeetsRepo {
  pub(crate) fn new(conn: tokio_rusqlite::Connection) -> Self { Self { conn } }

  async fn find(&self, id: &str) -> Result<Option<Meet>> {
    let id = id.to_owned();
    Ok(self.conn.call(move |conn| Ok(load_meet(conn, &id)?)).await?)
  }

  async fn require(&self, id: &str) -> CoreResult<Meet> {
    self
      .find(id)
      .await?
      .ok_or_else(|| CoreError::not_found("Meet", id))
  }
}

impl Repository for MeetsRepo {
  type Entity = Meet;
  type Create = NewMeet;
  type Update = MeetUpdate;

  async fn read_all(&self) -> CoreResult<Vec<Meet>> {
    let meets = self
      .conn
      .call(|conn| Ok(load_meets(conn, "ORDER BY m.rowid", [])?))
      .await
      .map_err(Error::from)?;
    Ok(meets)
  }

  async fn read_by_id(&self, id: &str) -> CoreResult<Meet> { self.require(id).await }

  async fn create(&self, input: NewMeet) -> CoreResult<Meet> {
    let id = Uuid::new_v4().to_string();
    let id_param = id.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO meets (
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

    debug!(meet_id = %id, "meet created");
    self.require(&id).await
  }

  async fn update(&self, id: &str, patch: MeetUpdate) -> CoreResult<Meet> {
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
        if !exists(conn, "meets", &id_param)? {
          return Ok(false);
        }
        apply_update(conn, "meets", &id_param, sets)?;
        Ok(true)
      })
      .await
      .map_err(Error::from)?;

    if !found {
      return Err(CoreError::not_found("Meet", id));
    }
    self.require(id).await
  }

  async fn delete(&self, id: &str) -> CoreResult<Meet> {
    let id_param = id.to_owned();
    let removed = self
      .conn
      .call(move |conn| {
        let Some(meet) = load_meet(conn, &id_param)? else {
          return Ok(None);
        };
        conn.execute("DELETE FROM meets WHERE id = ?1", rusqlite::params![id_param])?;
        Ok(Some(meet))
      })
      .await
      .map_err(Error::from)?;

    removed.ok_or_else(|| CoreError::not_found("Meet", id))
  }
}

impl SearchRepository for MeetsRepo {
  async fn search(&self, term: &str) -> CoreResult<Vec<Meet>> {
    let pattern = contains_pattern(term);
    let meets = self
      .conn
      .call(move |conn| {
        Ok(load_meets(
          conn,
          "WHERE m.title LIKE ?1 ESCAPE '\\' ORDER BY m.title",
          rusqlite::params![pattern],
        )?)
      })
      .await
      .map_err(Error::from)?;
    Ok(meets)
  }
}
