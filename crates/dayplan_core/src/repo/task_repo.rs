//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the durable create / upsert-by-key / read-all surface the
//!   assignment store persists through.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - The repository assigns task identifiers; callers never supply them.
//! - Write paths validate records before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Calls are synchronous, so writes for one task reach storage in exactly
//!   the order their in-memory mutations were issued.

use crate::db::migrations::latest_version;
use crate::db::{DbError, DbResult};
use crate::model::task::{
    validate_title, SlotAssignment, Task, TaskId, TaskStatus, TaskValidationError,
};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT uuid, title, created_at, status, slot FROM tasks";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for task persistence operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Db(DbError),
    /// Connection schema is not at the migrated version this repository
    /// requires.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted data cannot be converted to a valid task record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "task repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::UninitializedConnection { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
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

/// Field payload for creating a task record.
///
/// Status and slot are not part of the payload: every new record starts
/// `pending` and unscheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    /// Creation time in Unix epoch milliseconds.
    pub created_at: i64,
}

/// Durable key-value store of task records.
///
/// The assignment store is the sole caller; it treats this as the external
/// persistence collaborator and never rolls in-memory state back when a
/// write fails. The next session's `load_all` is the reconciliation
/// authority.
pub trait TaskRepository {
    /// Inserts a new record and returns the store-assigned identifier.
    fn create_task(&self, fields: &NewTask) -> RepoResult<TaskId>;
    /// Inserts or fully replaces the record keyed by `task.uuid`.
    fn upsert_task(&self, task: &Task) -> RepoResult<()>;
    /// Every stored record, ordered by creation time then id.
    fn load_all(&self) -> RepoResult<Vec<Task>>;
}

/// SQLite-backed task repository owning its connection.
#[derive(Debug)]
pub struct SqliteTaskRepository {
    conn: Connection,
}

impl SqliteTaskRepository {
    /// Wraps a bootstrapped connection after verifying its schema version.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_schema_version(&conn)?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository {
    fn create_task(&self, fields: &NewTask) -> RepoResult<TaskId> {
        validate_title(&fields.title)?;

        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO tasks (uuid, title, created_at, status, slot)
             VALUES (?1, ?2, ?3, ?4, NULL);",
            params![
                id.to_string(),
                fields.title.as_str(),
                fields.created_at,
                status_to_db(TaskStatus::Pending),
            ],
        )?;

        Ok(id)
    }

    fn upsert_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        self.conn.execute(
            "INSERT INTO tasks (uuid, title, created_at, status, slot)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (uuid) DO UPDATE SET
                title = excluded.title,
                created_at = excluded.created_at,
                status = excluded.status,
                slot = excluded.slot,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                task.uuid.to_string(),
                task.title.as_str(),
                task.created_at,
                status_to_db(task.status),
                task.slot.label(),
            ],
        )?;

        Ok(())
    }

    fn load_all(&self) -> RepoResult<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} ORDER BY created_at ASC, uuid ASC;"))?;

        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }
}

fn current_schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in tasks.uuid"))
    })?;

    let status_text: String = row.get("status")?;
    let status = parse_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in tasks.status"))
    })?;

    let slot = match row.get::<_, Option<String>>("slot")? {
        Some(label) => SlotAssignment::At(label),
        None => SlotAssignment::Unscheduled,
    };

    let task = Task {
        uuid,
        title: row.get("title")?,
        created_at: row.get("created_at")?,
        status,
        slot,
    };
    task.validate()?;
    Ok(task)
}

fn status_to_db(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "pending",
    }
}

fn parse_status(value: &str) -> Option<TaskStatus> {
    match value {
        "pending" => Some(TaskStatus::Pending),
        _ => None,
    }
}
