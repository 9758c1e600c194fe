//! Core traits for testability and abstraction.

use crate::error::Result;
use crate::tasks::models::Task;
use serde::Serialize;

/// Which kind of store a gateway talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// The `SQLite` database.
    Database,
    /// The local JSON file.
    Local,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Database => write!(f, "database"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// Trait for task persistence.
///
/// The production implementations are the `SQLite` store and the local JSON
/// file store; tests use an in-memory mock. Failures caused by the backing
/// store being absent or unreachable are reported as
/// [`Error::StoreUnavailable`](crate::error::Error::StoreUnavailable).
pub trait TaskGateway {
    /// Fetch every stored task.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn fetch_tasks(&self) -> Result<Vec<Task>>;

    /// Store a task and return it as stored.
    ///
    /// A new task is inserted and fails with `DuplicateTask` if its ID is
    /// taken. An existing task is replaced wholesale and fails with
    /// `TaskNotFound` if it is absent.
    ///
    /// # Errors
    ///
    /// Returns an error on conflict, on a missing task, or if the store fails.
    fn save_task(&self, task: &Task, is_new: bool) -> Result<Task>;

    /// Delete a task by ID.
    ///
    /// # Errors
    ///
    /// Returns `TaskNotFound` if no task has the ID, or an error if the
    /// store fails.
    fn delete_task(&self, id: &str) -> Result<()>;

    /// Insert or replace every given task and return the full stored
    /// collection. Tasks not in `tasks` are left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails; no task is written in that case.
    fn sync_tasks(&self, tasks: &[Task]) -> Result<Vec<Task>>;

    /// The kind of store behind this gateway.
    fn backend(&self) -> Backend;
}
