//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns, plus the row readers shared by
//! every repository.

use meetup_core::{
  Role,
  meet::MeetSummary,
  user::{Gender, UserSummary},
};
use rusqlite::{Connection, OptionalExtension as _, Row};

use crate::{Error, Result};

// ─── Role ─────────────────────────────────────────────────────────────────────

pub fn decode_role(s: &str) -> Result<Role> {
  s.parse().map_err(|_| Error::Decode(format!("unknown role: {s:?}")))
}

// ─── Gender ───────────────────────────────────────────────────────────────────

pub fn decode_gender(s: &str) -> Result<Gender> {
  match s {
    "male" => Ok(Gender::Male),
    "female" => Ok(Gender::Female),
    "unspecified" => Ok(Gender::Unspecified),
    other => Err(Error::Decode(format!("unknown gender: {other:?}"))),
  }
}

// ─── Summaries ────────────────────────────────────────────────────────────────

pub const USER_SUMMARY_COLUMNS: &str = "u.id, u.username, u.email";

pub fn user_summary(row: &Row<'_>) -> rusqlite::Result<UserSummary> {
  Ok(UserSummary {
    id:       row.get(0)?,
    username: row.get(1)?,
    email:    row.get(2)?,
  })
}

pub const MEET_SUMMARY_COLUMNS: &str =
  "m.id, m.title, m.sport, m.date, m.location, m.image";

pub fn meet_summary(row: &Row<'_>) -> rusqlite::Result<MeetSummary> {
  Ok(MeetSummary {
    id:       row.get(0)?,
    title:    row.get(1)?,
    sport:    row.get(2)?,
    date:     row.get(3)?,
    location: row.get(4)?,
    image:    row.get(5)?,
  })
}

/// Run `sql` with a single id parameter and collect every row through `map`.
pub fn query_by_id<T>(
  conn: &Connection,
  sql:  &str,
  id:   &str,
  map:  fn(&Row<'_>) -> rusqlite::Result<T>,
) -> rusqlite::Result<Vec<T>> {
  let mut stmt = conn.prepare(sql)?;
  stmt
    .query_map(rusqlite::params![id], map)?
    .collect::<rusqlite::Result<Vec<_>>>()
}

/// `LIKE` pattern matching `term` anywhere, with `%`, `_` and `\` taken
/// literally. Pair with `ESCAPE '\'`.
pub fn contains_pattern(term: &str) -> String {
  let mut pattern = String::with_capacity(term.len() + 2);
  pattern.push('%');
  for c in term.chars() {
    if matches!(c, '%' | '_' | '\\') {
      pattern.push('\\');
    }
    pattern.push(c);
  }
  pattern.push('%');
  pattern
}

// ─── Shared statements ────────────────────────────────────────────────────────

/// `table` must be one of the schema's own table names.
pub fn exists(conn: &Connection, table: &str, id: &str) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        &format!("SELECT 1 FROM {table} WHERE id = ?1"),
        rusqlite::params![id],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

/// Issue one `UPDATE` touching only the columns present in `sets`.
///
/// Column names come from the repositories, never from callers.
pub fn apply_update(
  conn: &Connection,
  table: &str,
  id:    &str,
  sets:  Vec<(&'static str, Option<String>)>,
) -> rusqlite::Result<()> {
  if sets.is_empty() {
    return Ok(());
  }

  let assignments = sets
    .iter()
    .enumerate()
    .map(|(i, (column, _))| format!("{column} = ?{}", i + 1))
    .collect::<Vec<_>>()
    .join(", ");
  let sql = format!(
    "UPDATE {table} SET {assignments} WHERE id = ?{}",
    sets.len() + 1
  );

  let mut values: Vec<Option<String>> = sets.into_iter().map(|(_, v)| v).collect();
  values.push(Some(id.to_owned()));
  conn.execute(&sql, rusqlite::params_from_iter(values))?;
  Ok(())
}

/// Collect the columns of a patch that were actually supplied.
macro_rules! present {
  ($($column:literal => $value:expr),* $(,)?) => {{
    let mut sets: Vec<(&'static str, Option<String>)> = Vec::new();
    $(
      if let Some(v) = $value {
        sets.push(($column, Some(v)));
      }
    )*
    sets
  }};
}

pub(crate) use present;
