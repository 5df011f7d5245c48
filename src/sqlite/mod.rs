//! SQLite-backed [`SequenceStore`].
//!
//! Counters live in one table:
//!
//! ```sql
//! CREATE TABLE order_sequences (
//!     year        INTEGER PRIMARY KEY,
//!     last_number INTEGER NOT NULL,
//!     updated_at  TEXT NOT NULL
//! );
//! ```
//!
//! Each increment is a single `INSERT … ON CONFLICT DO UPDATE … RETURNING`
//! statement, so concurrent writers (threads or processes sharing the file)
//! never receive the same value.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, params};

use crate::core::{SequenceStore, StoreError};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS order_sequences (
        year        INTEGER PRIMARY KEY,
        last_number INTEGER NOT NULL,
        updated_at  TEXT NOT NULL
    )";

const INCREMENT: &str = "
    INSERT INTO order_sequences (year, last_number, updated_at)
    VALUES (?1, 1, ?2)
    ON CONFLICT(year) DO UPDATE SET
        last_number = last_number + 1,
        updated_at  = excluded.updated_at
    RETURNING last_number";

const INCREMENT_WITHIN: &str = "
    INSERT INTO order_sequences (year, last_number, updated_at)
    VALUES (?1, 1, ?2)
    ON CONFLICT(year) DO UPDATE SET
        last_number = last_number + 1,
        updated_at  = excluded.updated_at
    WHERE last_number < ?3
    RETURNING last_number";

/// Order number counters in a SQLite database.
#[derive(Clone)]
pub struct SqliteSequenceStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSequenceStore {
    /// Open (or create) the database at `path` and ensure the table exists.
    ///
    /// Writers on other connections are waited on for up to five seconds.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(unavailable)?;
        conn.busy_timeout(BUSY_TIMEOUT).map_err(backend)?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// A private in-memory database, mainly for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(unavailable)?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// Share an existing connection and ensure the table exists.
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, StoreError> {
        let store = Self { conn };
        store.get_conn()?.execute(CREATE_TABLE, []).map_err(backend)?;
        Ok(store)
    }

    fn get_conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("connection lock poisoned: {e}")))
    }
}

impl SequenceStore for SqliteSequenceStore {
    fn increment(&self, year: i32) -> Result<u64, StoreError> {
        let conn = self.get_conn()?;
        let now = chrono::Utc::now().to_rfc3339();
        let value: i64 = conn
            .query_row(INCREMENT, params![year, now], |row| row.get(0))
            .map_err(backend)?;
        to_sequence(year, value)
    }

    fn current(&self, year: i32) -> Result<Option<u64>, StoreError> {
        let conn = self.get_conn()?;
        let value: Option<i64> = conn
            .query_row(
                "SELECT last_number FROM order_sequences WHERE year = ?1",
                params![year],
                |row| row.get(0),
            )
            .optional()
            .map_err(backend)?;
        value.map(|v| to_sequence(year, v)).transpose()
    }

    fn increment_within(&self, year: i32, max: u64) -> Result<Option<u64>, StoreError> {
        if max == 0 {
            return Ok(None);
        }
        let conn = self.get_conn()?;
        let now = chrono::Utc::now().to_rfc3339();
        let limit = i64::try_from(max).unwrap_or(i64::MAX);
        // no row comes back when the WHERE clause holds the counter at the limit
        let value: Option<i64> = conn
            .query_row(INCREMENT_WITHIN, params![year, now, limit], |row| row.get(0))
            .optional()
            .map_err(backend)?;
        value.map(|v| to_sequence(year, v)).transpose()
    }
}

fn to_sequence(year: i32, value: i64) -> Result<u64, StoreError> {
    u64::try_from(value).map_err(|_| StoreError::Corrupt { year, value })
}

fn unavailable(err: rusqlite::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

fn backend(err: rusqlite::Error) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(code, _)
            if matches!(
                code.code,
                rusqlite::ErrorCode::DatabaseBusy
                    | rusqlite::ErrorCode::DatabaseLocked
                    | rusqlite::ErrorCode::CannotOpen
            ) =>
        {
            StoreError::Unavailable(err.to_string())
        }
        _ => StoreError::Backend(err.to_string()),
    }
}
