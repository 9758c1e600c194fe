//! `SQLite` task store.
//!
//! Each operation opens a new connection to the database file. Tasks live in
//! the `tasks` table; their ordered dependency lists live in
//! `task_dependencies`, keyed by position. Dependency targets are not foreign
//! keys because dangling references are allowed.

use crate::error::{Error, Result};
use crate::tasks::models::{Status, Task};
use crate::tasks::status::parse_date;
use crate::traits::{Backend, TaskGateway};
use rusqlite::{params, Connection, ErrorCode, OpenFlags, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const TASK_COLUMNS: &str = "id, name, category, start_date, end_date, status, \
     initial_cost, actual_cost, notes, important";

/// SQLite-based task store.
#[derive(Debug, Clone)]
pub struct SqliteTaskStore {
    db_path: PathBuf,
    create: bool,
}

impl SqliteTaskStore {
    /// Create a store at the given path, creating the file if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        Self::connect(db_path, true)
    }

    /// Open a store and check that it answers queries.
    ///
    /// With `create` unset a missing file is not created and the call fails
    /// with [`Error::StoreUnavailable`]. Files that cannot be opened or are
    /// not databases fail the same way.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the database is absent or unreadable,
    /// or another error if schema setup fails.
    pub fn connect(db_path: impl AsRef<Path>, create: bool) -> Result<Self> {
        let store = Self { db_path: db_path.as_ref().to_path_buf(), create };
        if !create && !store.db_path.exists() {
            return Err(Error::StoreUnavailable(format!(
                "database not found at {}",
                store.db_path.display()
            )));
        }
        store.init_schema()?;
        store.health_check()?;
        Ok(store)
    }

    /// Get the database path.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Open a connection to the database.
    fn open(&self) -> Result<Connection> {
        let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if self.create {
            if let Some(parent) = self.db_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            flags |= OpenFlags::SQLITE_OPEN_CREATE;
        }

        let conn = Connection::open_with_flags(&self.db_path, flags).map_err(unavailable)?;
        conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA journal_mode = WAL;")
            .map_err(unavailable)?;
        Ok(conn)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                category TEXT NOT NULL DEFAULT 'Other',
                start_date TEXT,
                end_date TEXT,
                status TEXT NOT NULL DEFAULT 'not_started'
                    CHECK (status IN ('not_started', 'in_progress', 'completed', 'delayed')),
                initial_cost REAL NOT NULL DEFAULT 0,
                actual_cost REAL NOT NULL DEFAULT 0,
                notes TEXT NOT NULL DEFAULT '',
                important INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS task_dependencies (
                task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                depends_on TEXT NOT NULL,
                PRIMARY KEY (task_id, position)
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_category ON tasks(category);
            CREATE INDEX IF NOT EXISTS idx_task_dependencies_depends_on
                ON task_dependencies(depends_on);
            ",
        )
        .map_err(unavailable)?;

        Ok(())
    }

    fn health_check(&self) -> Result<()> {
        let conn = self.open()?;
        conn.query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get::<_, i64>(0))
            .map_err(unavailable)?;
        Ok(())
    }

    /// Parse a task from a row, without dependencies.
    fn parse_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
        let start: Option<String> = row.get(3)?;
        let end: Option<String> = row.get(4)?;
        let status: String = row.get(5)?;

        Ok(Task {
            id: row.get(0)?,
            name: row.get(1)?,
            category: row.get(2)?,
            start_date: start.as_deref().and_then(parse_date),
            end_date: end.as_deref().and_then(parse_date),
            status: Status::from_str(&status).unwrap_or_default(),
            initial_cost: row.get(6)?,
            actual_cost: row.get(7)?,
            dependencies: Vec::new(),
            notes: row.get(8)?,
            important: row.get(9)?,
        })
    }

    fn read_task(conn: &Connection, id: &str) -> Result<Option<Task>> {
        let task = conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                Self::parse_task,
            )
            .optional()?;

        let Some(mut task) = task else {
            return Ok(None);
        };
        let mut stmt = conn.prepare(
            "SELECT depends_on FROM task_dependencies WHERE task_id = ?1 ORDER BY position",
        )?;
        task.dependencies =
            stmt.query_map(params![id], |row| row.get(0))?.collect::<rusqlite::Result<_>>()?;
        Ok(Some(task))
    }

    fn read_all(conn: &Connection) -> Result<Vec<Task>> {
        let mut deps: HashMap<String, Vec<String>> = HashMap::new();
        let mut stmt = conn.prepare(
            "SELECT task_id, depends_on FROM task_dependencies ORDER BY task_id, position",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get(1)?)))?;
        for row in rows {
            let (task_id, depends_on) = row?;
            deps.entry(task_id).or_default().push(depends_on);
        }

        let mut stmt = conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY rowid"))?;
        let tasks = stmt
            .query_map([], Self::parse_task)?
            .map(|task| {
                task.map(|mut task| {
                    task.dependencies = deps.remove(&task.id).unwrap_or_default();
                    task
                })
            })
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    }

    fn exists(conn: &Connection, id: &str) -> Result<bool> {
        let exists =
            conn.query_row("SELECT EXISTS(SELECT 1 FROM tasks WHERE id = ?1)", params![id], |row| {
                row.get(0)
            })?;
        Ok(exists)
    }

    /// Insert a task, or overwrite every column of an existing one.
    fn upsert(conn: &Connection, task: &Task) -> Result<()> {
        conn.execute(
            &format!(
                "INSERT INTO tasks ({TASK_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    category = excluded.category,
                    start_date = excluded.start_date,
                    end_date = excluded.end_date,
                    status = excluded.status,
                    initial_cost = excluded.initial_cost,
                    actual_cost = excluded.actual_cost,
                    notes = excluded.notes,
                    important = excluded.important,
                    updated_at = datetime('now')"
            ),
            params![
                task.id,
                task.name,
                task.category,
                task.start_date.map(|d| d.format("%Y-%m-%d").to_string()),
                task.end_date.map(|d| d.format("%Y-%m-%d").to_string()),
                task.status.as_str(),
                task.initial_cost,
                task.actual_cost,
                task.notes,
                task.important,
            ],
        )?;
        Self::write_dependencies(conn, task)
    }

    fn write_dependencies(conn: &Connection, task: &Task) -> Result<()> {
        conn.execute("DELETE FROM task_dependencies WHERE task_id = ?1", params![task.id])?;
        let mut stmt = conn.prepare(
            "INSERT INTO task_dependencies (task_id, position, depends_on) VALUES (?1, ?2, ?3)",
        )?;
        for (position, depends_on) in task.dependencies.iter().enumerate() {
            stmt.execute(params![task.id, position, depends_on])?;
        }
        Ok(())
    }
}

impl TaskGateway for SqliteTaskStore {
    fn fetch_tasks(&self) -> Result<Vec<Task>> {
        let conn = self.open()?;
        Self::read_all(&conn)
    }

    fn save_task(&self, task: &Task, is_new: bool) -> Result<Task> {
        let mut conn = self.open()?;
        let tx = conn.transaction()?;

        let exists = Self::exists(&tx, &task.id)?;
        if is_new && exists {
            return Err(Error::DuplicateTask(task.id.clone()));
        }
        if !is_new && !exists {
            return Err(Error::TaskNotFound(task.id.clone()));
        }

        Self::upsert(&tx, task)?;
        let stored = Self::read_task(&tx, &task.id)?.ok_or_else(|| Error::TaskNotFound(task.id.clone()))?;
        tx.commit()?;
        Ok(stored)
    }

    fn delete_task(&self, id: &str) -> Result<()> {
        let conn = self.open()?;
        let rows = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(Error::TaskNotFound(id.to_string()));
        }
        Ok(())
    }

    fn sync_tasks(&self, tasks: &[Task]) -> Result<Vec<Task>> {
        let mut conn = self.open()?;
        let tx = conn.transaction()?;
        for task in tasks {
            Self::upsert(&tx, task)?;
        }
        tx.commit()?;
        Self::read_all(&conn)
    }

    fn backend(&self) -> Backend {
        Backend::Database
    }
}

/// Map connection-level failures to [`Error::StoreUnavailable`].
fn unavailable(error: rusqlite::Error) -> Error {
    let code = match &error {
        rusqlite::Error::SqliteFailure(failure, _) => Some(failure.code),
        _ => None,
    };
    match code {
        Some(
            ErrorCode::CannotOpen
            | ErrorCode::NotADatabase
            | ErrorCode::DatabaseCorrupt
            | ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked
            | ErrorCode::PermissionDenied
            | ErrorCode::ReadOnly
            | ErrorCode::SystemIoFailure,
        ) => Error::StoreUnavailable(error.to_string()),
        _ => Error::Database(error),
    }
}
