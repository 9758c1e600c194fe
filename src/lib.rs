//! # `wedding_planner`
//!
//! Core of a wedding-planning checklist: tasks with dates, statuses and
//! budgets; date-derived status rules; CSV import and export; category
//! colours; Gantt chart layout; and persistence to a `SQLite` database with a
//! local JSON file fallback.

#[cfg(feature = "cli")]
pub mod cli;
pub mod color;
pub mod config;
pub mod error;
pub mod gantt;
pub mod paths;
pub mod planner;
pub mod storage;
pub mod summary;
pub mod tasks;
pub mod templates;
pub mod testing;
pub mod traits;

pub use error::{Error, Result};
pub use planner::{ImportSummary, Planner, TaskFilter};
pub use tasks::{Status, Task};
pub use traits::{Backend, TaskGateway};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }
}
