//! Task model types for the wedding planner.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Category assigned when none is given.
pub const DEFAULT_CATEGORY: &str = "Other";

/// Categories with canonical casing and a pre-assigned palette colour.
///
/// Any other string is still a valid category; this list only drives
/// casing normalization and colours.
pub const KNOWN_CATEGORIES: &[&str] = &[
    "Venue",
    "Catering",
    "Attire",
    "Photography",
    "Music",
    "Flowers",
    "Decor",
    "Invitations",
    "Transportation",
    "Beauty",
    "Rings",
    "Honeymoon",
    "Legal",
    "Other",
];

/// Look up the canonical spelling of a known category, ignoring case.
#[must_use]
pub fn canonical_category(name: &str) -> Option<&'static str> {
    let name = name.trim();
    KNOWN_CATEGORIES.iter().copied().find(|known| known.eq_ignore_ascii_case(name))
}

/// Normalize a free-form category.
///
/// Known categories get their canonical casing, unknown ones keep their text
/// with the first letter upper-cased, and blank input becomes
/// [`DEFAULT_CATEGORY`].
#[must_use]
pub fn normalize_category(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_CATEGORY.to_string();
    }
    if let Some(known) = canonical_category(trimmed) {
        return known.to_string();
    }

    let mut chars = trimmed.chars();
    chars.next().map_or_else(String::new, |first| first.to_uppercase().chain(chars).collect())
}

/// Stored task status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Work has not begun.
    #[default]
    NotStarted,
    /// Work is under way.
    InProgress,
    /// Task is done.
    Completed,
    /// Task was explicitly marked as behind schedule.
    Delayed,
}

impl Status {
    /// All statuses in display order.
    pub const ALL: [Self; 4] = [Self::NotStarted, Self::InProgress, Self::Completed, Self::Delayed];

    /// Parse a status, ignoring case and word separators.
    ///
    /// Accepts the display labels (`"In Progress"`) as well as the serialized
    /// names (`"in_progress"`).
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a known status.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, InvalidStatus> {
        let squashed: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match squashed.as_str() {
            "notstarted" => Ok(Self::NotStarted),
            "inprogress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "delayed" => Ok(Self::Delayed),
            _ => Err(InvalidStatus(s.to_string())),
        }
    }

    /// Stored name, matching the serde representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Delayed => "delayed",
        }
    }

    /// Human-readable label, also used as the CSV representation.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Delayed => "Delayed",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Error when an invalid status string is provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStatus(pub String);

impl std::fmt::Display for InvalidStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid status: '{}' (must be one of: Not Started, In Progress, Completed, Delayed)",
            self.0
        )
    }
}

impl std::error::Error for InvalidStatus {}

/// One planning action on the checklist.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier within a collection.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Category; any string, see [`KNOWN_CATEGORIES`].
    pub category: String,
    /// First day of the task, if scheduled.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Last day of the task, if scheduled.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Stored status.
    #[serde(default)]
    pub status: Status,
    /// Budgeted cost.
    #[serde(default)]
    pub initial_cost: f64,
    /// Amount actually spent.
    #[serde(default)]
    pub actual_cost: f64,
    /// IDs of tasks this one waits on. Order is kept; duplicates and
    /// dangling IDs are tolerated.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: String,
    /// Flagged as important.
    #[serde(default)]
    pub important: bool,
}

impl Task {
    /// Create a task with the given ID and name in the default category.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: DEFAULT_CATEGORY.to_string(),
            ..Self::default()
        }
    }

    /// Whether both start and end dates are set.
    #[must_use]
    pub const fn is_scheduled(&self) -> bool {
        self.start_date.is_some() && self.end_date.is_some()
    }

    /// Whether this task lists itself as a dependency.
    #[must_use]
    pub fn depends_on_itself(&self) -> bool {
        self.dependencies.iter().any(|dep| dep == &self.id)
    }

    /// Actual spend minus budget.
    #[must_use]
    pub fn cost_variance(&self) -> f64 {
        self.actual_cost - self.initial_cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_str_labels() {
        assert_eq!(Status::from_str("Not Started").unwrap(), Status::NotStarted);
        assert_eq!(Status::from_str("in progress").unwrap(), Status::InProgress);
        assert_eq!(Status::from_str("COMPLETED").unwrap(), Status::Completed);
        assert_eq!(Status::from_str("Delayed").unwrap(), Status::Delayed);
    }

    #[test]
    fn test_status_from_str_serialized_names() {
        assert_eq!(Status::from_str("not_started").unwrap(), Status::NotStarted);
        assert_eq!(Status::from_str("in-progress").unwrap(), Status::InProgress);
        assert!(Status::from_str("done").is_err());
        assert!(Status::from_str("").is_err());
    }

    #[test]
    fn test_status_default_and_display() {
        assert_eq!(Status::default(), Status::NotStarted);
        assert_eq!(Status::InProgress.to_string(), "In Progress");
    }

    #[test]
    fn test_invalid_status_display() {
        let err = InvalidStatus("finished".to_string());
        assert!(err.to_string().contains("finished"));
        assert!(err.to_string().contains("Not Started"));
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&Status::NotStarted).unwrap();
        assert_eq!(json, "\"not_started\"");
    }

    #[test]
    fn test_canonical_category() {
        assert_eq!(canonical_category("venue"), Some("Venue"));
        assert_eq!(canonical_category("  PHOTOGRAPHY "), Some("Photography"));
        assert_eq!(canonical_category("Cake tasting"), None);
    }

    #[test]
    fn test_normalize_category() {
        assert_eq!(normalize_category("catering"), "Catering");
        assert_eq!(normalize_category("cake tasting"), "Cake tasting");
        assert_eq!(normalize_category("éclairs"), "Éclairs");
        assert_eq!(normalize_category("   "), "Other");
    }

    #[test]
    fn test_task_new_defaults() {
        let task = Task::new("t-1", "Book venue");
        assert_eq!(task.category, "Other");
        assert_eq!(task.status, Status::NotStarted);
        assert!(task.dependencies.is_empty());
        assert!(!task.is_scheduled());
    }

    #[test]
    fn test_depends_on_itself() {
        let mut task = Task::new("t-1", "Book venue");
        task.dependencies = vec!["t-2".to_string()];
        assert!(!task.depends_on_itself());
        task.dependencies.push("t-1".to_string());
        assert!(task.depends_on_itself());
    }

    #[test]
    fn test_cost_variance() {
        let mut task = Task::new("t-1", "Cake");
        task.initial_cost = 400.0;
        task.actual_cost = 450.5;
        assert!((task.cost_variance() - 50.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_task_serialization() {
        let mut task = Task::new("flowers-0001", "Order bouquets");
        task.category = "Flowers".to_string();
        task.start_date = NaiveDate::from_ymd_opt(2024, 5, 1);
        task.dependencies = vec!["venue-0000".to_string()];

        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"2024-05-01\""));
        let parsed: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, task);
    }

    #[test]
    fn test_task_deserialize_fills_defaults() {
        let parsed: Task =
            serde_json::from_str(r#"{"id":"a","name":"A","category":"Music"}"#).unwrap();
        assert_eq!(parsed.status, Status::NotStarted);
        assert!(parsed.start_date.is_none());
        assert!(!parsed.important);
    }
}
