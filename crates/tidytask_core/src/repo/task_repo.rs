//! Task store gateway: repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the four named CRUD operations over persisted tasks.
//! - Own the store handle lifecycle: connect, data operations, close.
//!
//! # Invariants
//! - Data operations require a live connection; a closed handle reports
//!   `RepoError::Closed` without touching the medium.
//! - Read paths reject malformed persisted rows instead of masking them.
//! - `fetch_all` returns rows in insertion order (`id` ascending).
//! - `update_task`/`remove_task` against a missing id fail with `NotFound`;
//!   they never silently no-op.

use crate::config::StoreLocation;
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::task::{Task, TaskStatus};
use log::{info, warn};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// The backing medium could not be opened or its schema prepared.
    Connection(DbError),
    /// A single statement failed against an established connection.
    Db(DbError),
    /// Operation referenced a task id absent from the store.
    NotFound(i64),
    /// Persisted row violates the task invariants.
    InvalidData(String),
    /// Data operation on a handle already released via `close`.
    Closed,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection(err) => write!(f, "task store unreachable: {err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
            Self::Closed => write!(f, "task store is closed"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connection(err) | Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::Closed => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the four named task operations.
pub trait TaskRepository {
    /// Returns every persisted task in insertion order.
    fn fetch_all(&self) -> RepoResult<Vec<Task>>;
    /// Inserts one task and returns the store-assigned id.
    fn add_task(&self, task: &Task) -> RepoResult<i64>;
    /// Rewrites the completion fields of the row identified by `id`.
    fn update_task(&self, status: TaskStatus, done: bool, id: i64) -> RepoResult<()>;
    /// Deletes the row identified by `id`.
    fn remove_task(&self, id: i64) -> RepoResult<()>;
}

/// SQLite-backed task store owning its connection for the process lifetime.
///
/// The handle is connected on construction and stays usable until `close`;
/// `Drop` releases the connection when the caller never closes explicitly.
pub struct SqliteTaskStore {
    conn: Option<Connection>,
}

impl SqliteTaskStore {
    /// Opens the configured backing medium and prepares the task schema.
    ///
    /// # Errors
    /// - `RepoError::Connection` when the medium cannot be opened or its
    ///   schema cannot be loaded.
    pub fn connect(location: &StoreLocation) -> RepoResult<Self> {
        let conn = match location {
            StoreLocation::File(path) => open_db(path),
            StoreLocation::Memory => open_db_in_memory(),
        }
        .map_err(RepoError::Connection)?;

        Ok(Self { conn: Some(conn) })
    }

    /// Releases the connection. Safe to call repeatedly.
    pub fn close(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };

        match conn.close() {
            Ok(()) => info!("event=store_close module=repo status=ok"),
            Err((_conn, err)) => {
                warn!("event=store_close module=repo status=error error={err}");
            }
        }
    }

    /// Reports whether `close` has already released the connection.
    pub fn is_closed(&self) -> bool {
        self.conn.is_none()
    }

    fn conn(&self) -> RepoResult<&Connection> {
        self.conn.as_ref().ok_or(RepoError::Closed)
    }
}

impl Drop for SqliteTaskStore {
    fn drop(&mut self) {
        self.close();
    }
}

impl TaskRepository for SqliteTaskStore {
    fn fetch_all(&self) -> RepoResult<Vec<Task>> {
        let mut stmt = self
            .conn()?
            .prepare("SELECT id, text, status, done, date FROM tasks ORDER BY id ASC;")?;

        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn add_task(&self, task: &Task) -> RepoResult<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO tasks (text, status, done, date) VALUES (?1, ?2, ?3, ?4);",
            params![
                task.text.as_str(),
                task.status.as_str(),
                bool_to_int(task.done),
                task.date.as_str(),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    fn update_task(&self, status: TaskStatus, done: bool, id: i64) -> RepoResult<()> {
        let changed = self.conn()?.execute(
            "UPDATE tasks SET status = ?1, done = ?2 WHERE id = ?3;",
            params![status.as_str(), bool_to_int(done), id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn remove_task(&self, id: i64) -> RepoResult<()> {
        let changed = self
            .conn()?
            .execute("DELETE FROM tasks WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id: i64 = row.get("id")?;
    let text: String = row.get("text")?;

    let status_text: String = row.get("status")?;
    let status = TaskStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in tasks.status for id {id}"
        ))
    })?;

    let done = match row.get::<_, i64>("done")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid done value `{other}` in tasks.done for id {id}"
            )));
        }
    };

    if (status == TaskStatus::Done) != done {
        return Err(RepoError::InvalidData(format!(
            "status `{status_text}` disagrees with done flag `{}` for id {id}",
            bool_to_int(done)
        )));
    }

    Ok(Task::from_parts(id, text, status, done, row.get::<_, String>("date")?))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
