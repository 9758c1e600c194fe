//! Task persistence.
//!
//! Two stores implement [`TaskGateway`]: the `SQLite` database store and the
//! local JSON file store. [`connect`] picks one once at startup.

pub mod local;
pub mod sqlite;

pub use local::LocalTaskStore;
pub use sqlite::SqliteTaskStore;

use crate::config::PlannerConfig;
use crate::error::Result;
use crate::traits::TaskGateway;
use std::path::Path;

/// Open the configured task store.
///
/// When a database is configured it is opened (created only if
/// `create_database` is set) and health-checked. If it is unavailable a
/// warning is logged and the local store is used instead. Without a
/// configured database the local store is used directly.
///
/// # Errors
///
/// Returns any database error other than unavailability.
pub fn connect(config: &PlannerConfig, base_dir: &Path) -> Result<Box<dyn TaskGateway>> {
    let local_path = config.resolved_local_store_path(base_dir);

    let Some(db_path) = config.resolved_database_path(base_dir) else {
        tracing::debug!(path = %local_path.display(), "no database configured; using local store");
        return Ok(Box::new(LocalTaskStore::new(local_path)));
    };

    match SqliteTaskStore::connect(&db_path, config.create_database) {
        Ok(store) => {
            tracing::debug!(path = %db_path.display(), "using database store");
            Ok(Box::new(store))
        }
        Err(error) if error.is_store_unavailable() => {
            tracing::warn!(%error, path = %local_path.display(), "database unavailable; falling back to local store");
            Ok(Box::new(LocalTaskStore::new(local_path)))
        }
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::models::Task;
    use crate::traits::Backend;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn config(database: Option<&str>, create: bool) -> PlannerConfig {
        PlannerConfig {
            database_path: database.map(PathBuf::from),
            create_database: create,
            local_store_path: Some(PathBuf::from("local/tasks.json")),
            ..PlannerConfig::default()
        }
    }

    #[test]
    fn test_no_database_uses_local_store() {
        let dir = TempDir::new().unwrap();
        let gateway = connect(&config(None, false), dir.path()).unwrap();
        assert_eq!(gateway.backend(), Backend::Local);
    }

    #[test]
    fn test_missing_database_falls_back_to_local() {
        let dir = TempDir::new().unwrap();
        let gateway = connect(&config(Some("planner.db"), false), dir.path()).unwrap();

        assert_eq!(gateway.backend(), Backend::Local);
        assert!(!dir.path().join("planner.db").exists());

        gateway.save_task(&Task::new("a", "A"), true).unwrap();
        assert!(dir.path().join("local/tasks.json").exists());
    }

    #[test]
    fn test_creatable_database_is_used() {
        let dir = TempDir::new().unwrap();
        let gateway = connect(&config(Some("planner.db"), true), dir.path()).unwrap();

        assert_eq!(gateway.backend(), Backend::Database);
        assert!(dir.path().join("planner.db").exists());
    }

    #[test]
    fn test_corrupt_database_falls_back_to_local() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("planner.db"), "garbage, not a database\n".repeat(64))
            .unwrap();

        let gateway = connect(&config(Some("planner.db"), false), dir.path()).unwrap();
        assert_eq!(gateway.backend(), Backend::Local);
    }
}
