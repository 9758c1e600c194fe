//! Local JSON file task store.
//!
//! The whole collection is kept as one pretty-printed JSON array. A missing
//! file reads as an empty collection; the file and its parent directory are
//! created on first write.

use crate::error::{Error, Result};
use crate::tasks::models::Task;
use crate::traits::{Backend, TaskGateway};
use std::path::{Path, PathBuf};

/// File-backed task store.
#[derive(Debug, Clone)]
pub struct LocalTaskStore {
    path: PathBuf,
}

impl LocalTaskStore {
    /// Create a store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the store file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<Task>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn store(&self, tasks: &[Task]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(tasks)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl TaskGateway for LocalTaskStore {
    fn fetch_tasks(&self) -> Result<Vec<Task>> {
        self.load()
    }

    fn save_task(&self, task: &Task, is_new: bool) -> Result<Task> {
        let mut tasks = self.load()?;
        let position = tasks.iter().position(|t| t.id == task.id);

        match (position, is_new) {
            (Some(_), true) => return Err(Error::DuplicateTask(task.id.clone())),
            (None, false) => return Err(Error::TaskNotFound(task.id.clone())),
            (Some(index), false) => tasks[index] = task.clone(),
            (None, true) => tasks.push(task.clone()),
        }

        self.store(&tasks)?;
        Ok(task.clone())
    }

    fn delete_task(&self, id: &str) -> Result<()> {
        let mut tasks = self.load()?;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(Error::TaskNotFound(id.to_string()));
        }
        self.store(&tasks)
    }

    fn sync_tasks(&self, incoming: &[Task]) -> Result<Vec<Task>> {
        let mut tasks = self.load()?;
        for task in incoming {
            match tasks.iter_mut().find(|t| t.id == task.id) {
                Some(existing) => *existing = task.clone(),
                None => tasks.push(task.clone()),
            }
        }
        self.store(&tasks)?;
        Ok(tasks)
    }

    fn backend(&self) -> Backend {
        Backend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::models::Status;
    use crate::tasks::status::parse_date;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, LocalTaskStore) {
        let dir = TempDir::new().unwrap();
        let store = LocalTaskStore::new(dir.path().join("data").join("tasks.json"));
        (dir, store)
    }

    #[test]
    fn test_missing_file_is_empty() {
        let (_dir, store) = create_test_store();
        assert!(store.fetch_tasks().unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_save_creates_file_and_round_trips() {
        let (_dir, store) = create_test_store();
        let mut task = Task::new("cake", "Order the cake");
        task.category = "Catering".to_string();
        task.start_date = parse_date("2024-05-01");
        task.status = Status::Completed;
        task.dependencies = vec!["menu".to_string()];

        store.save_task(&task, true).unwrap();

        assert!(store.path().exists());
        assert_eq!(store.fetch_tasks().unwrap(), vec![task]);
    }

    #[test]
    fn test_save_conflicts() {
        let (_dir, store) = create_test_store();
        store.save_task(&Task::new("a", "A"), true).unwrap();

        assert!(matches!(store.save_task(&Task::new("a", "A2"), true), Err(Error::DuplicateTask(_))));
        assert!(matches!(store.save_task(&Task::new("b", "B"), false), Err(Error::TaskNotFound(_))));
    }

    #[test]
    fn test_replace_keeps_position() {
        let (_dir, store) = create_test_store();
        store.save_task(&Task::new("a", "A"), true).unwrap();
        store.save_task(&Task::new("b", "B"), true).unwrap();

        store.save_task(&Task::new("a", "A2"), false).unwrap();

        let names: Vec<String> = store.fetch_tasks().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["A2", "B"]);
    }

    #[test]
    fn test_delete() {
        let (_dir, store) = create_test_store();
        store.save_task(&Task::new("a", "A"), true).unwrap();

        store.delete_task("a").unwrap();
        assert!(store.fetch_tasks().unwrap().is_empty());
        assert!(matches!(store.delete_task("a"), Err(Error::TaskNotFound(_))));
    }

    #[test]
    fn test_sync_merges_by_id() {
        let (_dir, store) = create_test_store();
        store.save_task(&Task::new("a", "A"), true).unwrap();
        store.save_task(&Task::new("b", "B"), true).unwrap();

        let stored = store.sync_tasks(&[Task::new("b", "B2"), Task::new("c", "C")]).unwrap();
        let names: Vec<&str> = stored.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B2", "C"]);
        assert_eq!(store.fetch_tasks().unwrap(), stored);
    }

    #[test]
    fn test_corrupt_file_is_json_error() {
        let (_dir, store) = create_test_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{ not json").unwrap();

        assert!(matches!(store.fetch_tasks(), Err(Error::Json(_))));
    }

    #[test]
    fn test_backend() {
        assert_eq!(LocalTaskStore::new("tasks.json").backend(), Backend::Local);
    }
}
