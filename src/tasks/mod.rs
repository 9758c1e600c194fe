//! Planning tasks.
//!
//! This module provides:
//! - The [`Task`] model and its [`Status`] vocabulary
//! - Date-derived status rules (delayed, due soon, active today)
//! - CSV import and export
//! - Task ID generation
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use wedding_planner::tasks::{csv, status, Status, Task};
//!
//! let mut task = Task::new("venue", "Book the venue");
//! task.end_date = NaiveDate::from_ymd_opt(2024, 3, 1);
//!
//! let today = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
//! assert!(status::is_delayed(&task, today));
//! assert_eq!(task.display_status(today), Status::Delayed);
//!
//! let parsed = csv::parse_csv(&csv::tasks_to_csv(&[task.clone()]));
//! assert_eq!(parsed, vec![task]);
//! ```

pub mod csv;
pub mod id;
pub mod models;
pub mod status;

pub use models::{InvalidStatus, Status, Task};
