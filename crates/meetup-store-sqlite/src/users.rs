//! [`UsersRepo`]: users, their logins and their relationship collections.

use meetup_core::{
  Error as CoreError, Result as CoreResult,
  meet::MeetSummary,
  relationship::{Direction, Relation, RelationshipRepository},
  repository::{LoginKey, LoginRepository, Repository, SearchRepository},
  user::{LoginRecord, NewUser, User, UserSummary, UserUpdate},
};
use rusqlite::{Connection, OptionalExtension as _, Row};
use tracing::debug;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    MEET_SUMMARY_COLUMNS, USER_SUMMARY_COLUMNS, apply_update, contains_pattern, decode_gender,
    decode_role, exists, meet_summary, present, query_by_id, user_summary,
  },
};

const USER_COLUMNS: &str =
  "id, username, email, role, avatar, location, birth_date, gender, bio";

// ─── Raw rows ─────────────────────────────────────────────────────────────────

struct RawUser {
  id:         String,
  username:   String,
  email:      String,
  role:       String,
  avatar:     Option<String>,
  location:   String,
  birth_date: String,
  gender:     String,
  bio:        String,
}

fn raw_user(row: &Row<'_>) -> rusqlite::Result<RawUser> {
  Ok(RawUser {
    id:         row.get(0)?,
    username:   row.get(1)?,
    email:      row.get(2)?,
    role:       row.get(3)?,
    avatar:     row.get(4)?,
    location:   row.get(5)?,
    birth_date: row.get(6)?,
    gender:     row.get(7)?,
    bio:        row.get(8)?,
  })
}

/// A user row together with every collection the API exposes on it.
struct RawUserGraph {
  user:          RawUser,
  friends:       Vec<UserSummary>,
  created_meets: Vec<MeetSummary>,
  saved_meets:   Vec<MeetSummary>,
  joined_meets:  Vec<MeetSummary>,
}

impl RawUserGraph {
  fn into_user(self) -> Result<User> {
    let RawUserGraph { user, friends, created_meets, saved_meets, joined_meets } = self;
    Ok(User {
      role: decode_role(&user.role)?,
      gender: decode_gender(&user.gender)?,
      id: user.id,
      username: user.username,
      email: user.email,
      avatar: user.avatar,
      location: user.location,
      birth_date: user.birth_date,
      bio: user.bio,
      friends,
      created_meets,
      saved_meets,
      joined_meets,
    })
  }
}

// ─── Queries ──────────────────────────────────────────────────────────────────

/// Edge table and target column backing each relation.
fn edge_table(relation: Relation) -> (&'static str, &'static str) {
  match relation {
    Relation::Friends => ("friendships", "friend_id"),
    Relation::SavedMeets => ("saved_meets", "meet_id"),
    Relation::JoinedMeets => ("joined_meets", "meet_id"),
  }
}

fn friends_of(conn: &Connection, id: &str) -> rusqlite::Result<Vec<UserSummary>> {
  query_by_id(
    conn,
    &format!(
      "SELECT {USER_SUMMARY_COLUMNS} FROM users u
       JOIN friendships f ON f.friend_id = u.id
       WHERE f.user_id = ?1 ORDER BY f.rowid"
    ),
    id,
    user_summary,
  )
}

fn meets_of(
  conn: &Connection,
  relation: Relation,
  id: &str,
) -> rusqlite::Result<Vec<MeetSummary>> {
  let (table, column) = edge_table(relation);
  query_by_id(
    conn,
    &format!(
      "SELECT {MEET_SUMMARY_COLUMNS} FROM meets m
       JOIN {table} e ON e.{column} = m.id
       WHERE e.user_id = ?1 ORDER BY e.rowid"
    ),
    id,
    meet_summary,
  )
}

fn load_user(conn: &Connection, id: &str) -> rusqlite::Result<Option<RawUserGraph>> {
  let user = conn
    .query_row(
      &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
      rusqlite::params![id],
      raw_user,
    )
    .optional()?;

  let Some(user) = user else {
    return Ok(None);
  };

  Ok(Some(RawUserGraph {
    friends: friends_of(conn, id)?,
    created_meets: query_by_id(
      conn,
      &format!(
        "SELECT {MEET_SUMMARY_COLUMNS} FROM meets m WHERE m.creator_id = ?1 ORDER BY m.rowid"
      ),
      id,
      meet_summary,
    )?,
    saved_meets: meets_of(conn, Relation::SavedMeets, id)?,
    joined_meets: meets_of(conn, Relation::JoinedMeets, id)?,
    user,
  }))
}

fn load_users(conn: &Connection, ids: Vec<String>) -> rusqlite::Result<Vec<RawUserGraph>> {
  let mut users = Vec::with_capacity(ids.len());
  for id in ids {
    if let Some(user) = load_user(conn, &id)? {
      users.push(user);
    }
  }
  Ok(users)
}

fn select_ids(
  conn: &Connection,
  sql: &str,
  params: impl rusqlite::Params,
) -> rusqlite::Result<Vec<String>> {
  let mut stmt = conn.prepare(sql)?;
  stmt
    .query_map(params, |row| row.get(0))?
    .collect::<rusqlite::Result<Vec<_>>>()
}

/// Result of an edge mutation, decided inside the transaction.
enum Membership {
  Applied,
  MissingOwner,
  MissingTarget,
  SelfEdge,
}

// ─── Repository ───────────────────────────────────────────────────────────────

/// Users backed by the shared SQLite connection.
#[derive(Clone)]
pub struct UsersRepo {
  conn: tokio_rusqlite::Connection,
}

impl UsersRepo {
  pub(crate) fn new(conn: tokio_rusqlite::Connection) -> Self { Self { conn } }

  async fn find(&self, id: &str) -> Result<Option<User>> {
    let id = id.to_owned();
    let raw = self.conn.call(move |conn| Ok(load_user(conn, &id)?)).await?;
    raw.map(RawUserGraph::into_user).transpose()
  }

  async fn find_many(&self, sql: &'static str, param: Option<String>) -> Result<Vec<User>> {
    let raws = self
      .conn
      .call(move |conn| {
        let ids = match param {
          Some(p) => select_ids(conn, sql, rusqlite::params![p])?,
          None => select_ids(conn, sql, [])?,
        };
        Ok(load_users(conn, ids)?)
      })
      .await?;
    raws.into_iter().map(RawUserGraph::into_user).collect()
  }

  async fn require(&self, id: &str) -> CoreResult<User> {
    self
      .find(id)
      .await?
      .ok_or_else(|| CoreError::not_found("User", id))
  }
}

impl Repository for UsersRepo {
  type Entity = User;
  type Create = NewUser;
  type Update = UserUpdate;

  async fn read_all(&self) -> CoreResult<Vec<User>> {
    Ok(self.find_many("SELECT id FROM users ORDER BY rowid", None).await?)
  }

  async fn read_by_id(&self, id: &str) -> CoreResult<User> { self.require(id).await }

  async fn create(&self, input: NewUser) -> CoreResult<User> {
    let id = Uuid::new_v4().to_string();
    let id_param = id.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (
             id, username, email, password, role,
             avatar, location, birth_date, gender, bio
           ) VALUES (?1, ?2, ?3, ?4, 'user', ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id_param,
            input.username,
            input.email,
            input.password,
            input.avatar,
            input.location,
            input.birth_date,
            input.gender.as_str(),
            input.bio,
          ],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::from)?;

    debug!(user_id = %id, "user created");
    self.require(&id).await
  }

  async fn update(&self, id: &str, patch: UserUpdate) -> CoreResult<User> {
    let id_param = id.to_owned();
    let sets = present! {
      "username"   => patch.username,
      "email"      => patch.email,
      "password"   => patch.password,
      "avatar"     => patch.avatar,
      "location"   => patch.location,
      "birth_date" => patch.birth_date,
      "bio"        => patch.bio,
    };

    let found = self
      .conn
      .call(move |conn| {
        if !exists(conn, "users", &id_param)? {
          return Ok(false);
        }
        apply_update(conn, "users", &id_param, sets)?;
        Ok(true)
      })
      .await
      .map_err(Error::from)?;

    if !found {
      return Err(CoreError::not_found("User", id));
    }
    self.require(id).await
  }

  async fn delete(&self, id: &str) -> CoreResult<User> {
    let id_param = id.to_owned();
    let removed = self
      .conn
      .call(move |conn| {
        let Some(raw) = load_user(conn, &id_param)? else {
          return Ok(None);
        };
        conn.execute("DELETE FROM users WHERE id = ?1", rusqlite::params![id_param])?;
        Ok(Some(raw))
      })
      .await
      .map_err(Error::from)?;

    match removed {
      Some(raw) => Ok(raw.into_user()?),
      None => Err(CoreError::not_found("User", id)),
    }
  }
}

impl LoginRepository for UsersRepo {
  async fn search_for_login(&self, key: LoginKey, value: &str) -> CoreResult<LoginRecord> {
    let column = key.as_str();
    let value_param = value.to_owned();

    let row = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT id, username, email, role, password FROM users WHERE {column} = ?1"
              ),
              rusqlite::params![value_param],
              |row| {
                Ok((
                  row.get::<_, String>(0)?,
                  row.get::<_, String>(1)?,
                  row.get::<_, String>(2)?,
                  row.get::<_, String>(3)?,
                  row.get::<_, String>(4)?,
                ))
              },
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::from)?;

    let (id, username, email, role, password) = row
      .ok_or_else(|| CoreError::BadRequest(format!("Invalid {column} or password")))?;

    Ok(LoginRecord { id, username, email, role: decode_role(&role)?, password })
  }
}

impl SearchRepository for UsersRepo {
  async fn search(&self, term: &str) -> CoreResult<Vec<User>> {
    Ok(
      self
        .find_many(
          "SELECT id FROM users WHERE username LIKE ?1 ESCAPE '\\' ORDER BY username",
          Some(contains_pattern(term)),
        )
        .await?,
    )
  }
}

impl RelationshipRepository for UsersRepo {
  async fn set_membership(
    &self,
    owner_id: &str,
    target_id: &str,
    relation: Relation,
    direction: Direction,
  ) -> CoreResult<User> {
    let owner = owner_id.to_owned();
    let target = target_id.to_owned();

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !exists(&tx, "users", &owner)? {
          return Ok(Membership::MissingOwner);
        }

        let (table, column) = edge_table(relation);
        match direction {
          Direction::Connect => {
            let target_table = if relation.targets_meets() { "meets" } else { "users" };
            if !exists(&tx, target_table, &target)? {
              return Ok(Membership::MissingTarget);
            }
            if relation == Relation::Friends && owner == target {
              return Ok(Membership::SelfEdge);
            }
            let sql = format!("INSERT OR IGNORE INTO {table} (user_id, {column}) VALUES (?1, ?2)");
            tx.execute(&sql, rusqlite::params![owner, target])?;
            // Friendship is mutual: both directions are written together.
            if relation == Relation::Friends {
              tx.execute(&sql, rusqlite::params![target, owner])?;
            }
          }
          Direction::Disconnect => {
            let sql = format!("DELETE FROM {table} WHERE user_id = ?1 AND {column} = ?2");
            tx.execute(&sql, rusqlite::params![owner, target])?;
            if relation == Relation::Friends {
              tx.execute(&sql, rusqlite::params![target, owner])?;
            }
          }
        }

        tx.commit()?;
        Ok(Membership::Applied)
      })
      .await
      .map_err(Error::from)?;

    match outcome {
      Membership::Applied => {
        debug!(owner_id, target_id, relation = relation.name(), ?direction, "membership applied");
        self.require(owner_id).await
      }
      Membership::MissingOwner => Err(CoreError::not_found("User", owner_id)),
      Membership::MissingTarget if relation.targets_meets() => {
        Err(CoreError::not_found("Meet", target_id))
      }
      Membership::MissingTarget => Err(CoreError::not_found("User", target_id)),
      Membership::SelfEdge => {
        Err(CoreError::BadRequest("A user cannot befriend themselves".to_string()))
      }
    }
  }

  async fn get_friends(&self, owner_id: &str) -> CoreResult<Vec<UserSummary>> {
    let owner = owner_id.to_owned();
    let friends = self
      .conn
      .call(move |conn| {
        if !exists(conn, "users", &owner)? {
          return Ok(None);
        }
        Ok(Some(friends_of(conn, &owner)?))
      })
      .await
      .map_err(Error::from)?;

    friends.ok_or_else(|| CoreError::not_found("User", owner_id))
  }

  async fn get_meets(&self, owner_id: &str, relation: Relation) -> CoreResult<Vec<MeetSummary>> {
    if !relation.targets_meets() {
      return Err(CoreError::BadRequest(format!(
        "{} is not a meet collection",
        relation.name()
      )));
    }

    let owner = owner_id.to_owned();
    let meets = self
      .conn
      .call(move |conn| {
        if !exists(conn, "users", &owner)? {
          return Ok(None);
        }
        Ok(Some(meets_of(conn, relation, &owner)?))
      })
      .await
      .map_err(Error::from)?;

    meets.ok_or_else(|| CoreError::not_found("User", owner_id))
  }
}
