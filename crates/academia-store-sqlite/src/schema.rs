//! SQL schema for the Academia SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Identity provider side: one credential per account, keyed by email.
CREATE TABLE IF NOT EXISTS credentials (
    user_id       TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,    -- argon2 PHC string
    created_at    TEXT NOT NULL
);

-- Role partitions. RUTs are stored in compact form (no separators).
-- Uniqueness across partitions is checked on insert, not by the schema.
CREATE TABLE IF NOT EXISTS admins (
    account_id  TEXT PRIMARY KEY REFERENCES credentials(user_id) ON DELETE CASCADE,
    rut         TEXT NOT NULL UNIQUE,
    email       TEXT NOT NULL,
    full_name   TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS students (
    account_id  TEXT PRIMARY KEY REFERENCES credentials(user_id) ON DELETE CASCADE,
    rut         TEXT NOT NULL UNIQUE,
    email       TEXT NOT NULL,
    full_name   TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    sport       TEXT
);

CREATE TABLE IF NOT EXISTS professors (
    account_id  TEXT PRIMARY KEY REFERENCES credentials(user_id) ON DELETE CASCADE,
    rut         TEXT NOT NULL UNIQUE,
    email       TEXT NOT NULL,
    full_name   TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    discipline  TEXT
);

CREATE TABLE IF NOT EXISTS kinesiologists (
    account_id     TEXT PRIMARY KEY REFERENCES credentials(user_id) ON DELETE CASCADE,
    rut            TEXT NOT NULL UNIQUE,
    email          TEXT NOT NULL,
    full_name      TEXT NOT NULL,
    created_at     TEXT NOT NULL,
    license_number TEXT
);

CREATE TABLE IF NOT EXISTS nutritionists (
    account_id     TEXT PRIMARY KEY REFERENCES credentials(user_id) ON DELETE CASCADE,
    rut            TEXT NOT NULL UNIQUE,
    email          TEXT NOT NULL,
    full_name      TEXT NOT NULL,
    created_at     TEXT NOT NULL,
    license_number TEXT
);

-- Issued sessions. `partition` stays NULL until the login flow binds the
-- partition it resolved; unbound sessions never authorize anything.
CREATE TABLE IF NOT EXISTS sessions (
    token_digest TEXT PRIMARY KEY,   -- hex SHA-256 of the bearer token
    user_id      TEXT NOT NULL REFERENCES credentials(user_id) ON DELETE CASCADE,
    email        TEXT NOT NULL,
    partition    TEXT,
    issued_at    TEXT NOT NULL,
    expires_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS sessions_user_idx    ON sessions(user_id);
CREATE INDEX IF NOT EXISTS sessions_expires_idx ON sessions(expires_at);

PRAGMA user_version = 1;
";
