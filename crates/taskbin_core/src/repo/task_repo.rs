//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Load and save the active and recycled task sets.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `save_both` on SQLite writes both tables in one transaction.
//! - Between `begin` and `commit` the SQLite repository holds the database
//!   write lock, so a load-modify-save cycle cannot interleave with another
//!   process.
//! - Rows are returned in `position` order, which mirrors insertion order.
//! - Read paths validate rows and fail with `InvalidData` on corruption.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::task::{Task, TaskValidationError};
use log::warn;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const ACTIVE_SELECT_SQL: &str = "SELECT
    id,
    title,
    completed,
    due_date,
    category,
    created_at,
    updated_at,
    restored_at
FROM active_tasks
ORDER BY position ASC, id ASC;";

const RECYCLED_SELECT_SQL: &str = "SELECT
    id,
    title,
    completed,
    due_date,
    category,
    created_at,
    updated_at,
    deleted_at
FROM recycled_tasks
ORDER BY position ASC, id ASC;";

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence failure surfaced by repositories.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// `begin` was called while a unit of work was already open.
    UnitOfWorkOpen,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with db::open_db"
            ),
            Self::UnitOfWorkOpen => write!(f, "a repository unit of work is already open"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) | Self::UninitializedConnection { .. } | Self::UnitOfWorkOpen => {
                None
            }
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

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

/// Persistence collaborator for the lifecycle manager.
pub trait TaskRepository {
    fn load_active(&self) -> RepoResult<Vec<Task>>;
    fn save_active(&mut self, tasks: &[Task]) -> RepoResult<()>;
    fn load_recycle(&self) -> RepoResult<Vec<Task>>;
    fn save_recycle(&mut self, tasks: &[Task]) -> RepoResult<()>;

    /// Persists both sets after a cross-set move.
    ///
    /// The default writes them one after another; a crash between the two
    /// writes can duplicate or lose the moved task. Backends that support
    /// transactions should override this.
    fn save_both(&mut self, active: &[Task], recycle: &[Task]) -> RepoResult<()> {
        self.save_active(active)?;
        self.save_recycle(recycle)
    }

    /// Opens a unit of work spanning the following loads and saves.
    ///
    /// Backends without transactions keep the no-op default.
    fn begin(&mut self) -> RepoResult<()> {
        Ok(())
    }

    /// Makes every save since `begin` durable.
    fn commit(&mut self) -> RepoResult<()> {
        Ok(())
    }

    /// Discards every save since `begin`. Safe to call with nothing open.
    fn rollback(&mut self) {}
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository {
    conn: Connection,
    in_unit_of_work: bool,
}

impl SqliteTaskRepository {
    /// Wraps a connection opened through `db::open_db` or `db::open_db_in_memory`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        let actual_version = current_user_version(&conn)?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self {
            conn,
            in_unit_of_work: false,
        })
    }

    /// Borrows the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Runs `write` directly when a unit of work is open, otherwise inside
    /// its own transaction.
    fn write<F>(&mut self, write: F) -> RepoResult<()>
    where
        F: FnOnce(&Connection) -> RepoResult<()>,
    {
        if self.in_unit_of_work {
            return write(&self.conn);
        }
        let tx = self.conn.transaction()?;
        write(&tx)?;
        tx.commit()?;
        Ok(())
    }
}

impl TaskRepository for SqliteTaskRepository {
    fn load_active(&self) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(ACTIVE_SELECT_SQL)?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row, false)?);
        }
        Ok(tasks)
    }

    fn save_active(&mut self, tasks: &[Task]) -> RepoResult<()> {
        self.write(|conn| replace_active(conn, tasks))
    }

    fn load_recycle(&self) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(RECYCLED_SELECT_SQL)?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row, true)?);
        }
        Ok(tasks)
    }

    fn save_recycle(&mut self, tasks: &[Task]) -> RepoResult<()> {
        self.write(|conn| replace_recycled(conn, tasks))
    }

    fn save_both(&mut self, active: &[Task], recycle: &[Task]) -> RepoResult<()> {
        self.write(|conn| {
            replace_active(conn, active)?;
            replace_recycled(conn, recycle)
        })
    }

    fn begin(&mut self) -> RepoResult<()> {
        if self.in_unit_of_work {
            return Err(RepoError::UnitOfWorkOpen);
        }
        // Write lock is held from the first load until commit.
        self.conn.execute_batch("BEGIN IMMEDIATE;")?;
        self.in_unit_of_work = true;
        Ok(())
    }

    fn commit(&mut self) -> RepoResult<()> {
        if !self.in_unit_of_work {
            return Ok(());
        }
        self.conn.execute_batch("COMMIT;")?;
        self.in_unit_of_work = false;
        Ok(())
    }

    fn rollback(&mut self) {
        if !self.in_unit_of_work {
            return;
        }
        self.in_unit_of_work = false;
        if let Err(err) = self.conn.execute_batch("ROLLBACK;") {
            warn!("event=repo_rollback module=repo status=error error={err}");
        }
    }
}

fn replace_active(conn: &Connection, tasks: &[Task]) -> RepoResult<()> {
    conn.execute("DELETE FROM active_tasks;", [])?;
    let mut stmt = conn.prepare(
        "INSERT INTO active_tasks (
            id,
            position,
            title,
            completed,
            due_date,
            category,
            created_at,
            updated_at,
            restored_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
    )?;

    for (position, task) in tasks.iter().enumerate() {
        if task.deleted_at.is_some() {
            return Err(TaskValidationError::DeletedAtMismatch {
                id: task.id,
                recycled: false,
            }
            .into());
        }
        stmt.execute(params![
            task.id.to_string(),
            position_to_db(position)?,
            task.title.as_str(),
            bool_to_int(task.completed),
            task.due_date.as_deref(),
            task.category.as_deref(),
            task.created_at,
            task.updated_at,
            task.restored_at,
        ])?;
    }
    Ok(())
}

fn replace_recycled(conn: &Connection, tasks: &[Task]) -> RepoResult<()> {
    conn.execute("DELETE FROM recycled_tasks;", [])?;
    let mut stmt = conn.prepare(
        "INSERT INTO recycled_tasks (
            id,
            position,
            title,
            completed,
            due_date,
            category,
            created_at,
            updated_at,
            deleted_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
    )?;

    for (position, task) in tasks.iter().enumerate() {
        let deleted_at = task
            .deleted_at
            .ok_or(TaskValidationError::DeletedAtMismatch {
                id: task.id,
                recycled: true,
            })?;
        stmt.execute(params![
            task.id.to_string(),
            position_to_db(position)?,
            task.title.as_str(),
            bool_to_int(task.completed),
            task.due_date.as_deref(),
            task.category.as_deref(),
            task.created_at,
            task.updated_at,
            deleted_at,
        ])?;
    }
    Ok(())
}

fn parse_task_row(row: &Row<'_>, recycled: bool) -> RepoResult<Task> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|_| RepoError::InvalidData(format!("invalid task id `{id_text}`")))?;

    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid completed value `{other}` for task {id}"
            )));
        }
    };

    let (deleted_at, restored_at) = if recycled {
        (Some(row.get::<_, i64>("deleted_at")?), None)
    } else {
        (None, row.get("restored_at")?)
    };

    let task = Task {
        id,
        title: row.get("title")?,
        completed,
        due_date: row.get("due_date")?,
        category: row.get("category")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        deleted_at,
        restored_at,
    };
    task.validate()?;
    Ok(task)
}

fn position_to_db(position: usize) -> RepoResult<i64> {
    i64::try_from(position)
        .map_err(|_| RepoError::InvalidData(format!("position {position} overflows i64")))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
