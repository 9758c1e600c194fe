//! Testing utilities and mock implementations.
//!
//! These types are provided for use in tests. They may appear unused in
//! the library itself but are consumed by unit tests.

#![allow(dead_code)]

use crate::error::{Error, Result};
use crate::tasks::models::Task;
use crate::traits::{Backend, TaskGateway};
use std::cell::{Cell, RefCell};

/// How the next gateway call should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Fail with `StoreUnavailable`.
    Unavailable,
    /// Fail with a validation-style error unrelated to availability.
    Rejected,
}

impl Failure {
    fn into_error(self) -> Error {
        match self {
            Self::Unavailable => Error::StoreUnavailable("mock store offline".to_string()),
            Self::Rejected => Error::Validation("mock store rejected the write".to_string()),
        }
    }
}

/// An in-memory task gateway for testing.
///
/// Behaves like the real stores, and can be told to fail its next call.
#[derive(Debug, Default)]
pub struct MockTaskGateway {
    tasks: RefCell<Vec<Task>>,
    fail_next: Cell<Option<Failure>>,
    calls: RefCell<Vec<String>>,
}

impl MockTaskGateway {
    /// Create an empty mock gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock gateway holding `tasks`.
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks: RefCell::new(tasks), ..Self::default() }
    }

    /// Make the next call fail.
    pub fn fail_next(&self, failure: Failure) {
        self.fail_next.set(Some(failure));
    }

    /// Snapshot of the stored tasks.
    #[must_use]
    pub fn stored(&self) -> Vec<Task> {
        self.tasks.borrow().clone()
    }

    /// Names of the methods called so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn enter(&self, method: &str) -> Result<()> {
        self.calls.borrow_mut().push(method.to_string());
        match self.fail_next.take() {
            Some(failure) => Err(failure.into_error()),
            None => Ok(()),
        }
    }
}

impl TaskGateway for MockTaskGateway {
    fn fetch_tasks(&self) -> Result<Vec<Task>> {
        self.enter("fetch_tasks")?;
        Ok(self.stored())
    }

    fn save_task(&self, task: &Task, is_new: bool) -> Result<Task> {
        self.enter("save_task")?;
        let mut tasks = self.tasks.borrow_mut();
        let position = tasks.iter().position(|t| t.id == task.id);
        match (position, is_new) {
            (Some(_), true) => return Err(Error::DuplicateTask(task.id.clone())),
            (None, false) => return Err(Error::TaskNotFound(task.id.clone())),
            (Some(index), false) => tasks[index] = task.clone(),
            (None, true) => tasks.push(task.clone()),
        }
        Ok(task.clone())
    }

    fn delete_task(&self, id: &str) -> Result<()> {
        self.enter("delete_task")?;
        let mut tasks = self.tasks.borrow_mut();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(Error::TaskNotFound(id.to_string()));
        }
        Ok(())
    }

    fn sync_tasks(&self, incoming: &[Task]) -> Result<Vec<Task>> {
        self.enter("sync_tasks")?;
        let mut tasks = self.tasks.borrow_mut();
        for task in incoming {
            match tasks.iter_mut().find(|t| t.id == task.id) {
                Some(existing) => *existing = task.clone(),
                None => tasks.push(task.clone()),
            }
        }
        Ok(tasks.clone())
    }

    fn backend(&self) -> Backend {
        Backend::Local
    }
}
