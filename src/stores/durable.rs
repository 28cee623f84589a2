//! Durable account storage on SQLite.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;

use super::{Account, Backend};
use crate::error::{Error, Operation, Result};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const CREATE_ACCOUNTS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS accounts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT UNIQUE NOT NULL,
        amount INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )";

/// Account storage in a SQLite `accounts` relation.
///
/// Each operation is exactly one statement, run on the blocking thread pool.
/// Name uniqueness is enforced by the relation's `UNIQUE` constraint and
/// absence is detected from the affected-row count.
pub struct DurableBackend {
    conn: Arc<Mutex<Connection>>,
}

impl DurableBackend {
    /// Opens (or creates) the database file and makes sure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> rusqlite::Result<Self> {
        let path = path.as_ref();
        let backend = Self::init(Connection::open(path)?)?;
        info!(path = %path.display(), "durable store ready");
        Ok(backend)
    }

    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> rusqlite::Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        // In-memory databases answer "memory" here.
        let _mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        conn.execute(CREATE_ACCOUNTS_TABLE, [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `statement` against the connection off the async runtime.
    ///
    /// A call abandoned by its caller still runs to completion here.
    async fn run<T, F>(&self, op: Operation, name: &str, statement: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let owned_name = name.to_owned();
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| Error::unavailable(op, owned_name, "connection lock poisoned"))?;
            statement(&conn)
        })
        .await
        .map_err(|err| Error::unavailable(op, name, err))?
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Maps a store failure, treating a unique violation as a name collision on
/// `collision_name`.
fn map_write_error(err: rusqlite::Error, op: Operation, name: &str, collision_name: &str) -> Error {
    if is_unique_violation(&err) {
        Error::already_exists(op, collision_name)
    } else {
        Error::unavailable(op, name, err)
    }
}

fn require_affected(rows: usize, op: Operation, name: &str) -> Result<()> {
    if rows == 0 {
        return Err(Error::not_found(op, name));
    }
    Ok(())
}

#[async_trait]
impl Backend for DurableBackend {
    async fn create(&self, name: &str, amount: i64) -> Result<()> {
        let key = name.to_owned();
        self.run(Operation::Create, name, move |conn| {
            conn.execute(
                "INSERT INTO accounts (name, amount) VALUES (?1, ?2)",
                params![key, amount],
            )
            .map_err(|err| map_write_error(err, Operation::Create, &key, &key))?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let key = name.to_owned();
        self.run(Operation::Delete, name, move |conn| {
            let rows = conn
                .execute("DELETE FROM accounts WHERE name = ?1", params![key])
                .map_err(|err| Error::unavailable(Operation::Delete, &key, err))?;
            require_affected(rows, Operation::Delete, &key)
        })
        .await
    }

    async fn rename(&self, name: &str, new_name: &str) -> Result<()> {
        let (from, to) = (name.to_owned(), new_name.to_owned());
        self.run(Operation::Rename, name, move |conn| {
            let rows = conn
                .execute(
                    "UPDATE accounts SET name = ?1, updated_at = CURRENT_TIMESTAMP WHERE name = ?2",
                    params![to, from],
                )
                .map_err(|err| map_write_error(err, Operation::Rename, &from, &to))?;
            require_affected(rows, Operation::Rename, &from)
        })
        .await
    }

    async fn set_amount(&self, name: &str, amount: i64) -> Result<()> {
        let key = name.to_owned();
        self.run(Operation::SetAmount, name, move |conn| {
            let rows = conn
                .execute(
                    "UPDATE accounts SET amount = ?1, updated_at = CURRENT_TIMESTAMP WHERE name = ?2",
                    params![amount, key],
                )
                .map_err(|err| Error::unavailable(Operation::SetAmount, &key, err))?;
            require_affected(rows, Operation::SetAmount, &key)
        })
        .await
    }

    async fn get(&self, name: &str) -> Result<Account> {
        let key = name.to_owned();
        self.run(Operation::Get, name, move |conn| {
            conn.query_row(
                "SELECT name, amount FROM accounts WHERE name = ?1",
                params![key],
                |row| {
                    Ok(Account {
                        name: row.get(0)?,
                        amount: row.get(1)?,
                    })
                },
            )
            .optional()
            .map_err(|err| Error::unavailable(Operation::Get, &key, err))?
            .ok_or_else(|| Error::not_found(Operation::Get, &key))
        })
        .await
    }

    async fn list(&self) -> Result<Vec<Account>> {
        self.run(Operation::List, "*", |conn| {
            let unavailable = |err: rusqlite::Error| Error::unavailable(Operation::List, "*", err);
            let mut stmt = conn
                .prepare("SELECT name, amount FROM accounts ORDER BY name")
                .map_err(unavailable)?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(Account {
                        name: row.get(0)?,
                        amount: row.get(1)?,
                    })
                })
                .map_err(unavailable)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(unavailable)
        })
        .await
    }
}
