//! Dashboard aggregates over a task collection.

use crate::tasks::models::{Status, Task};
use crate::tasks::status::{is_active_today, is_delayed, is_due_soon};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;

/// Tasks and spend for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBudget {
    /// Category name as stored.
    pub category: String,
    /// Number of tasks in the category.
    pub task_count: usize,
    /// Sum of initial (budgeted) costs.
    pub initial_cost: f64,
    /// Sum of actual costs.
    pub actual_cost: f64,
}

/// Number of tasks with a given stored status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    /// The status.
    pub status: Status,
    /// Tasks with that status.
    pub count: usize,
}

/// Totals and counts shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetSummary {
    /// Number of tasks.
    pub task_count: usize,
    /// Tasks whose stored status is `Completed`.
    pub completed_count: usize,
    /// Completed share of all tasks, 0 to 100.
    pub completion_pct: f64,
    /// Sum of initial costs.
    pub total_initial_cost: f64,
    /// Sum of actual costs.
    pub total_actual_cost: f64,
    /// Actual minus initial.
    pub variance: f64,
    /// Tasks that are delayed as of today.
    pub delayed_count: usize,
    /// Unfinished tasks ending within the next week.
    pub due_soon_count: usize,
    /// Tasks whose date range contains now.
    pub active_count: usize,
    /// Tasks flagged important.
    pub important_count: usize,
    /// Stored status counts, in display order.
    pub status_counts: Vec<StatusCount>,
    /// Per-category lines, sorted by category name.
    pub categories: Vec<CategoryBudget>,
}

impl BudgetSummary {
    /// Aggregate `tasks` as of `today` (day rules) and `now` (active rule).
    #[must_use]
    pub fn compute(tasks: &[Task], today: NaiveDate, now: NaiveDateTime) -> Self {
        let task_count = tasks.len();
        let completed_count = tasks.iter().filter(|t| t.status == Status::Completed).count();
        let total_initial_cost: f64 = tasks.iter().map(|t| t.initial_cost).sum();
        let total_actual_cost: f64 = tasks.iter().map(|t| t.actual_cost).sum();

        let status_counts = Status::ALL
            .iter()
            .map(|&status| StatusCount {
                status,
                count: tasks.iter().filter(|t| t.status == status).count(),
            })
            .collect();

        let mut by_category: BTreeMap<&str, CategoryBudget> = BTreeMap::new();
        for task in tasks {
            let line = by_category.entry(task.category.as_str()).or_insert_with(|| CategoryBudget {
                category: task.category.clone(),
                task_count: 0,
                initial_cost: 0.0,
                actual_cost: 0.0,
            });
            line.task_count += 1;
            line.initial_cost += task.initial_cost;
            line.actual_cost += task.actual_cost;
        }

        Self {
            task_count,
            completed_count,
            completion_pct: percentage(completed_count, task_count),
            total_initial_cost,
            total_actual_cost,
            variance: total_actual_cost - total_initial_cost,
            delayed_count: tasks.iter().filter(|t| is_delayed(t, today)).count(),
            due_soon_count: tasks.iter().filter(|t| is_due_soon(t, today)).count(),
            active_count: tasks.iter().filter(|t| is_active_today(t, now)).count(),
            important_count: tasks.iter().filter(|t| t.important).count(),
            status_counts,
            categories: by_category.into_values().collect(),
        }
    }

    /// Whether actual spend exceeds the budget.
    #[must_use]
    pub fn over_budget(&self) -> bool {
        self.variance > 0.0
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::status::parse_date;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn task(id: &str, category: &str, status: Status, initial: f64, actual: f64) -> Task {
        let mut task = Task::new(id, id);
        task.category = category.to_string();
        task.status = status;
        task.initial_cost = initial;
        task.actual_cost = actual;
        task
    }

    #[test]
    fn test_empty_collection() {
        let today = date("2024-06-10");
        let summary = BudgetSummary::compute(&[], today, today.and_hms_opt(9, 0, 0).unwrap());
        assert_eq!(summary.task_count, 0);
        assert!(summary.completion_pct.abs() < f64::EPSILON);
        assert!(summary.categories.is_empty());
        assert_eq!(summary.status_counts.len(), 4);
        assert!(!summary.over_budget());
    }

    #[test]
    fn test_totals_and_categories() {
        let today = date("2024-06-10");
        let tasks = vec![
            task("a", "Venue", Status::Completed, 5000.0, 5200.0),
            task("b", "Catering", Status::InProgress, 3000.0, 1000.0),
            task("c", "Venue", Status::NotStarted, 500.0, 0.0),
            task("d", "Catering", Status::Completed, 200.0, 250.0),
        ];
        let summary = BudgetSummary::compute(&tasks, today, today.and_hms_opt(0, 0, 0).unwrap());

        assert_eq!(summary.task_count, 4);
        assert_eq!(summary.completed_count, 2);
        assert!((summary.completion_pct - 50.0).abs() < 1e-9);
        assert!((summary.total_initial_cost - 8700.0).abs() < 1e-9);
        assert!((summary.total_actual_cost - 6450.0).abs() < 1e-9);
        assert!((summary.variance + 2250.0).abs() < 1e-9);
        assert!(!summary.over_budget());

        let names: Vec<&str> = summary.categories.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["Catering", "Venue"]);
        assert_eq!(summary.categories[1].task_count, 2);
        assert!((summary.categories[1].actual_cost - 5200.0).abs() < 1e-9);
    }

    #[test]
    fn test_status_counts_use_stored_status() {
        let today = date("2024-06-10");
        let mut late = task("a", "Venue", Status::NotStarted, 0.0, 0.0);
        late.start_date = parse_date("2024-06-01");
        let tasks = vec![late, task("b", "Venue", Status::Delayed, 0.0, 0.0)];

        let summary = BudgetSummary::compute(&tasks, today, today.and_hms_opt(0, 0, 0).unwrap());
        let count = |status| summary.status_counts.iter().find(|c| c.status == status).unwrap().count;
        assert_eq!(count(Status::NotStarted), 1);
        assert_eq!(count(Status::Delayed), 1);
        assert_eq!(summary.delayed_count, 2);
    }

    #[test]
    fn test_date_counts() {
        let today = date("2024-06-10");
        let now = today.and_hms_opt(0, 0, 0).unwrap();

        let mut due = task("due", "Music", Status::InProgress, 0.0, 0.0);
        due.start_date = parse_date("2024-06-01");
        due.end_date = parse_date("2024-06-12");
        let mut later = task("later", "Music", Status::NotStarted, 0.0, 0.0);
        later.start_date = parse_date("2024-08-01");
        later.end_date = parse_date("2024-08-12");
        later.important = true;

        let summary = BudgetSummary::compute(&[due, later], today, now);
        assert_eq!(summary.due_soon_count, 1);
        assert_eq!(summary.active_count, 1);
        assert_eq!(summary.delayed_count, 0);
        assert_eq!(summary.important_count, 1);
    }
}
