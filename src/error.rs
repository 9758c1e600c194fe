//! Error types for `wedding_planner`.

use std::path::PathBuf;

/// Errors that can occur while planning, importing or persisting tasks.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON parsing error occurred.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error occurred.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A `SQLite` database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The backing store is absent or unreachable.
    ///
    /// Callers treat this as a signal to fall back to local storage.
    #[error("Task store unavailable: {0}")]
    StoreUnavailable(String),

    /// A referenced task does not exist.
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// A task with this ID already exists.
    #[error("Task already exists: {0}")]
    DuplicateTask(String),

    /// A task failed form validation.
    #[error("{0}")]
    Validation(String),

    /// The import file contained no data at all.
    #[error("Import file is empty")]
    EmptyImport,

    /// The import file could not be read.
    #[error("Could not read import file {path}: {source}")]
    UnreadableImport {
        /// The file that was being imported.
        path: PathBuf,
        /// The underlying read error.
        #[source]
        source: std::io::Error,
    },

    /// A template error occurred.
    #[error("Template error: {0}")]
    Template(String),
}

impl Error {
    /// Whether this error means the store itself is missing, as opposed to a
    /// failed operation against a working store.
    #[must_use]
    pub const fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
