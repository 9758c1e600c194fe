//! The in-memory task collection and the operations on it.
//!
//! [`Planner`] owns the collection for a session. Writes are applied to the
//! collection first and then sent to the gateway; if the gateway fails the
//! collection is restored to its previous state and the error is returned.

use crate::error::{Error, Result};
use crate::gantt::{self, GanttLayout, GanttMode};
use crate::summary::BudgetSummary;
use crate::tasks::csv::{parse_csv, tasks_to_csv};
use crate::tasks::id::generate_task_id;
use crate::tasks::models::{normalize_category, Status, Task};
use crate::tasks::status::{is_delayed, is_due_soon};
use crate::traits::{Backend, TaskGateway};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

/// Filter options for listing tasks.
#[derive(Debug, Default, Clone)]
pub struct TaskFilter {
    /// Only tasks in this category (ignoring case).
    pub category: Option<String>,
    /// Only tasks with this stored status.
    pub status: Option<Status>,
    /// Only tasks that are delayed as of today.
    pub delayed: bool,
    /// Only tasks that are due soon as of today.
    pub due_soon: bool,
    /// Only tasks flagged important.
    pub important: bool,
}

impl TaskFilter {
    /// Whether `task` passes every set condition.
    #[must_use]
    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        if let Some(category) = &self.category {
            if !task.category.eq_ignore_ascii_case(category.trim()) {
                return false;
            }
        }
        if self.status.is_some_and(|status| task.status != status) {
            return false;
        }
        (!self.delayed || is_delayed(task, today))
            && (!self.due_soon || is_due_soon(task, today))
            && (!self.important || task.important)
    }
}

/// Outcome of a CSV import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Rows imported.
    pub imported: usize,
    /// Imported rows that replaced an existing task.
    pub replaced: usize,
    /// Imported rows added as new tasks.
    pub added: usize,
}

/// Owner of the task collection for one session.
pub struct Planner<'g> {
    gateway: &'g dyn TaskGateway,
    tasks: Vec<Task>,
}

impl std::fmt::Debug for Planner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Planner")
            .field("backend", &self.gateway.backend())
            .field("tasks", &self.tasks.len())
            .finish()
    }
}

impl<'g> Planner<'g> {
    /// Load the collection from `gateway`.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway cannot fetch the tasks.
    pub fn load(gateway: &'g dyn TaskGateway) -> Result<Self> {
        let tasks = gateway.fetch_tasks()?;
        tracing::debug!(count = tasks.len(), backend = %gateway.backend(), "loaded tasks");
        Ok(Self { gateway, tasks })
    }

    /// All tasks, in stored order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// The task with the given ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// The store the collection is persisted to.
    #[must_use]
    pub fn backend(&self) -> Backend {
        self.gateway.backend()
    }

    /// A fresh ID for a task named `name`, unused in the collection.
    #[must_use]
    pub fn new_task_id(&self, name: &str) -> String {
        loop {
            let id = generate_task_id(name);
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    /// Insert or replace a task.
    ///
    /// A task whose ID is not in the collection is inserted; otherwise the
    /// existing task is replaced wholesale. The category is normalized the
    /// same way imports normalize it.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank name or a self dependency, or the
    /// gateway error after rolling the collection back.
    pub fn save(&mut self, mut task: Task) -> Result<Task> {
        validate(&task)?;
        task.category = normalize_category(&task.category);

        let snapshot = self.tasks.clone();
        let position = self.tasks.iter().position(|t| t.id == task.id);
        let is_new = position.is_none();
        match position {
            Some(index) => self.tasks[index] = task.clone(),
            None => self.tasks.push(task.clone()),
        }

        match self.gateway.save_task(&task, is_new) {
            Ok(stored) => {
                if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == stored.id) {
                    *slot = stored.clone();
                }
                tracing::debug!(id = %stored.id, is_new, "saved task");
                Ok(stored)
            }
            Err(error) => {
                tracing::warn!(%error, id = %task.id, "save failed; reverting");
                self.tasks = snapshot;
                Err(error)
            }
        }
    }

    /// Delete a task by ID.
    ///
    /// Other tasks that depend on it keep the now-dangling reference.
    ///
    /// # Errors
    ///
    /// Returns `TaskNotFound` if the ID is not in the collection, or the
    /// gateway error after rolling the collection back.
    pub fn delete(&mut self, id: &str) -> Result<Task> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        let removed = self.tasks.remove(index);

        if let Err(error) = self.gateway.delete_task(id) {
            tracing::warn!(%error, id, "delete failed; reverting");
            self.tasks.insert(index, removed);
            return Err(error);
        }

        tracing::debug!(id, "deleted task");
        Ok(removed)
    }

    /// Import tasks from CSV text and persist them.
    ///
    /// Rows are cleaned with [`sanitize_import`], then merged by ID: rows
    /// matching an existing task replace it, the rest are appended. Input
    /// with no valid rows is not an error and imports nothing.
    ///
    /// # Errors
    ///
    /// Returns `EmptyImport` for blank input, or the gateway error after
    /// rolling the collection back.
    pub fn import_csv(&mut self, text: &str) -> Result<ImportSummary> {
        if text.trim().is_empty() {
            return Err(Error::EmptyImport);
        }

        let parsed = parse_csv(text);
        if parsed.is_empty() {
            tracing::info!("import contained no valid rows");
            return Ok(ImportSummary::default());
        }
        let batch = sanitize_import(parsed, &self.tasks);

        let snapshot = self.tasks.clone();
        let mut summary = ImportSummary { imported: batch.len(), ..ImportSummary::default() };
        for task in &batch {
            match self.tasks.iter_mut().find(|t| t.id == task.id) {
                Some(existing) => {
                    *existing = task.clone();
                    summary.replaced += 1;
                }
                None => {
                    self.tasks.push(task.clone());
                    summary.added += 1;
                }
            }
        }

        match self.gateway.sync_tasks(&batch) {
            Ok(stored) => {
                self.tasks = stored;
                tracing::info!(
                    imported = summary.imported,
                    replaced = summary.replaced,
                    added = summary.added,
                    "imported tasks"
                );
                Ok(summary)
            }
            Err(error) => {
                tracing::warn!(%error, "import failed; reverting");
                self.tasks = snapshot;
                Err(error)
            }
        }
    }

    /// Import tasks from a UTF-8 CSV file.
    ///
    /// # Errors
    ///
    /// Returns `UnreadableImport` if the file cannot be read as UTF-8 text,
    /// otherwise as [`Planner::import_csv`].
    pub fn import_file(&mut self, path: &Path) -> Result<ImportSummary> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| Error::UnreadableImport { path: path.to_path_buf(), source })?;
        self.import_csv(&text)
    }

    /// The whole collection as CSV.
    #[must_use]
    pub fn export_csv(&self) -> String {
        tasks_to_csv(&self.tasks)
    }

    /// Gantt layout of the collection.
    #[must_use]
    pub fn gantt(&self, mode: GanttMode<'_>, today: NaiveDate) -> GanttLayout {
        gantt::layout(&self.tasks, mode, today)
    }

    /// Dashboard aggregates of the collection.
    #[must_use]
    pub fn summary(&self, today: NaiveDate, now: NaiveDateTime) -> BudgetSummary {
        BudgetSummary::compute(&self.tasks, today, now)
    }

    /// Tasks passing `filter`, in stored order.
    #[must_use]
    pub fn filter(&self, filter: &TaskFilter, today: NaiveDate) -> Vec<&Task> {
        self.tasks.iter().filter(|t| filter.matches(t, today)).collect()
    }
}

fn validate(task: &Task) -> Result<()> {
    if task.name.trim().is_empty() {
        return Err(Error::Validation("Task name is required.".to_string()));
    }
    if task.depends_on_itself() {
        return Err(Error::Validation(format!("\"{}\" cannot depend on itself.", task.name)));
    }
    Ok(())
}

/// Clean a parsed import batch against the existing collection.
///
/// IDs repeated within the batch are replaced with fresh ones, keeping the
/// first occurrence. Dependencies that point at neither an existing task nor
/// a task in the batch are dropped, as are self references.
#[must_use]
pub fn sanitize_import(mut batch: Vec<Task>, existing: &[Task]) -> Vec<Task> {
    let existing_ids: HashSet<&str> = existing.iter().map(|t| t.id.as_str()).collect();

    let mut seen: HashSet<String> = HashSet::new();
    for task in &mut batch {
        if !seen.insert(task.id.clone()) {
            let mut id = generate_task_id(&task.name);
            while seen.contains(&id) || existing_ids.contains(id.as_str()) {
                id = generate_task_id(&task.name);
            }
            tracing::debug!(old = %task.id, new = %id, "regenerated duplicate import id");
            task.id.clone_from(&id);
            seen.insert(id);
        }
    }

    for task in &mut batch {
        let own_id = task.id.clone();
        task.dependencies
            .retain(|dep| *dep != own_id && (seen.contains(dep) || existing_ids.contains(dep.as_str())));
    }

    batch
}
