// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! SQLite-backed content tables: `posts` (counted, never edited here) and
//! `taxonomies` (custom taxonomy rows with a unique slug).

mod taxonomies;

pub use taxonomies::TaxonomyRow;

use rusqlite::{Connection, ErrorCode, params};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

/// Ordered schema steps; `PRAGMA user_version` records how many have run.
const SCHEMA_MIGRATIONS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS posts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        post_type TEXT NOT NULL,
        title TEXT NOT NULL DEFAULT '',
        status TEXT NOT NULL DEFAULT 'publish'
    );
    CREATE INDEX IF NOT EXISTS idx_posts_type ON posts (post_type);",
    "CREATE TABLE IF NOT EXISTS taxonomies (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        singular TEXT NOT NULL,
        slug TEXT NOT NULL UNIQUE,
        description TEXT NOT NULL DEFAULT '',
        hierarchical INTEGER NOT NULL DEFAULT 0,
        post_types TEXT NOT NULL DEFAULT ''
    );",
];

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UniqueViolation(String),
    LockPoisoned,
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbError::Sqlite(err) => write!(f, "Database error: {}", err),
            DbError::UniqueViolation(detail) => write!(f, "Unique constraint violated: {}", detail),
            DbError::LockPoisoned => write!(f, "Database connection lock poisoned"),
        }
    }
}

impl std::error::Error for DbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DbError::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(code, detail) = &err
            && code.code == ErrorCode::ConstraintViolation
            && code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        {
            return DbError::UniqueViolation(detail.clone().unwrap_or_default());
        }
        DbError::Sqlite(err)
    }
}

/// Post counts by content type.
pub trait ContentQuery: Send + Sync {
    fn count_by_type(&self, post_type: &str) -> Result<u64, DbError>;

    fn counts_by_type(&self) -> Result<BTreeMap<String, u64>, DbError>;
}

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, DbError> {
        apply_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub(crate) fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, rusqlite::Error>,
    ) -> Result<T, DbError> {
        let conn = self.conn.lock().map_err(|_| DbError::LockPoisoned)?;
        f(&conn).map_err(DbError::from)
    }

    pub fn schema_version(&self) -> Result<i64, DbError> {
        self.with_conn(|conn| conn.query_row("PRAGMA user_version", [], |row| row.get(0)))
    }

    /// Adds a content record. Authoring lives outside the admin surface; this
    /// exists for seeding and tests.
    pub fn insert_post(&self, post_type: &str, title: &str) -> Result<i64, DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO posts (post_type, title) VALUES (?1, ?2)",
                params![post_type, title],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }
}

impl ContentQuery for Database {
    fn count_by_type(&self, post_type: &str) -> Result<u64, DbError> {
        let count: i64 = self.with_conn(|conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM posts WHERE post_type = ?1",
                params![post_type],
                |row| row.get(0),
            )
        })?;
        Ok(count.max(0) as u64)
    }

    fn counts_by_type(&self) -> Result<BTreeMap<String, u64>, DbError> {
        self.with_conn(|conn| {
            let mut statement =
                conn.prepare("SELECT post_type, COUNT(*) FROM posts GROUP BY post_type")?;
            let rows = statement.query_map([], |row| {
                let post_type: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                Ok((post_type, count.max(0) as u64))
            })?;
            rows.collect()
        })
    }
}

fn apply_migrations(conn: &Connection) -> Result<(), DbError> {
    let current: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    for (index, step) in SCHEMA_MIGRATIONS.iter().enumerate() {
        let version = index as i64 + 1;
        if version <= current {
            continue;
        }
        conn.execute_batch(step)?;
        conn.execute_batch(&format!("PRAGMA user_version = {};", version))?;
        log::info!("Applied content database schema version {}", version);
    }
    Ok(())
}
