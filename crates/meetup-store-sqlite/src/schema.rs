//! SQL schema for the meetup SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id          TEXT PRIMARY KEY,
    username    TEXT NOT NULL UNIQUE,
    email       TEXT NOT NULL UNIQUE,
    password    TEXT NOT NULL,      -- argon2 PHC string, never plaintext
    role        TEXT NOT NULL DEFAULT 'user',
    avatar      TEXT,
    location    TEXT NOT NULL,
    birth_date  TEXT NOT NULL,
    gender      TEXT NOT NULL,      -- 'male' | 'female' | 'unspecified'
    bio         TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS meets (
    id          TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    sport       TEXT NOT NULL,
    date        TEXT NOT NULL,
    location    TEXT,
    image       TEXT,
    creator_id  TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS events (
    id          TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    sport       TEXT NOT NULL,
    date        TEXT NOT NULL,
    location    TEXT,
    image       TEXT,
    creator_id  TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE
);

-- Relationship edges. The primary keys make INSERT OR IGNORE a no-op for
-- an edge that already exists.
CREATE TABLE IF NOT EXISTS friendships (
    user_id   TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    friend_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    PRIMARY KEY (user_id, friend_id),
    CHECK (user_id != friend_id)
);

CREATE TABLE IF NOT EXISTS saved_meets (
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    meet_id TEXT NOT NULL REFERENCES meets(id) ON DELETE CASCADE,
    PRIMARY KEY (user_id, meet_id)
);

CREATE TABLE IF NOT EXISTS joined_meets (
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    meet_id TEXT NOT NULL REFERENCES meets(id) ON DELETE CASCADE,
    PRIMARY KEY (user_id, meet_id)
);

CREATE INDEX IF NOT EXISTS meets_creator_idx   ON meets(creator_id);
CREATE INDEX IF NOT EXISTS events_creator_idx  ON events(creator_id);
CREATE INDEX IF NOT EXISTS joined_meets_idx    ON joined_meets(meet_id);

PRAGMA user_version = 1;
";
