//! CSV import and export of task lists.
//!
//! The format has eleven positional columns:
//!
//! ```text
//! ID,Task Name,Category,Start Date,End Date,Status,Initial Cost,Actual Cost,Dependencies,Notes,Important
//! ```
//!
//! Export always quotes `Task Name`, `Dependencies` and `Notes`, doubling any
//! embedded quotes. Import is lenient: rows with fewer than five columns are
//! dropped, and every field falls back to a default when missing or invalid.

use crate::tasks::id::generate_task_id;
use crate::tasks::models::{normalize_category, Status, Task};
use crate::tasks::status::parse_date;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Header row written on export.
pub const CSV_HEADER: &str = "ID,Task Name,Category,Start Date,End Date,Status,Initial Cost,Actual Cost,Dependencies,Notes,Important";

/// Name given to imported rows without one.
pub const UNTITLED_TASK: &str = "Untitled Task";

/// Rows with fewer fields than this are discarded on import.
const MIN_FIELDS: usize = 5;

static COST_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").expect("cost pattern is valid")
});

/// Serialize tasks to CSV text, header first, rows separated by `\n`.
#[must_use]
pub fn tasks_to_csv(tasks: &[Task]) -> String {
    let mut lines = Vec::with_capacity(tasks.len() + 1);
    lines.push(CSV_HEADER.to_string());
    lines.extend(tasks.iter().map(task_to_row));
    lines.join("\n")
}

fn task_to_row(task: &Task) -> String {
    let fields = [
        quote_if_needed(&task.id),
        quote(&task.name),
        quote_if_needed(&task.category),
        format_date(task.start_date),
        format_date(task.end_date),
        task.status.label().to_string(),
        format_cost(task.initial_cost),
        format_cost(task.actual_cost),
        quote(&task.dependencies.join(",")),
        quote(&task.notes),
        if task.important { "Yes" } else { "No" }.to_string(),
    ];
    fields.join(",")
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn quote_if_needed(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        quote(value)
    } else {
        value.to_string()
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

fn format_cost(cost: f64) -> String {
    format!("{cost}")
}

/// Parse CSV text into tasks.
///
/// The first line is the header and is skipped, as are blank lines. Every
/// other record becomes a task unless it has fewer than five fields; a
/// malformed record is dropped on its own and parsing resumes after it. See
/// the module docs for the column order.
#[must_use]
pub fn parse_csv(text: &str) -> Vec<Task> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let lines: Vec<&str> = text.split("\r\n").flat_map(|line| line.split(['\r', '\n'])).collect();

    let mut tasks = Vec::new();
    let mut index = 1;
    while index < lines.len() {
        if lines[index].trim().is_empty() {
            index += 1;
            continue;
        }
        match scan_record(&lines[index..]) {
            Some((fields, consumed)) => {
                tasks.extend(row_to_task(&fields));
                index += consumed;
            }
            None => index += 1,
        }
    }
    tasks
}

/// Tokenize the record starting at `lines[0]`.
///
/// Commas separate fields. A field that opens with `"` is quoted: everything
/// up to the closing quote is literal except `""`, which yields a single
/// quote, and the field may continue over following lines. A quote opened
/// mid-field runs to the end of its line at most.
///
/// Returns the fields and the number of lines used, or `None` when a quoted
/// field is never closed.
fn scan_record(lines: &[&str]) -> Option<(Vec<String>, usize)> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut fresh = true;
    let mut in_quotes = false;
    let mut multiline = false;

    for (number, line) in lines.iter().enumerate() {
        let mut chars = line.chars().peekable();
        while let Some(c) = chars.next() {
            if in_quotes {
                match c {
                    '"' if chars.peek() == Some(&'"') => {
                        chars.next();
                        field.push('"');
                    }
                    '"' => in_quotes = false,
                    _ => field.push(c),
                }
                continue;
            }

            match c {
                '"' => {
                    in_quotes = true;
                    multiline = fresh;
                    fresh = false;
                }
                ',' => {
                    fields.push(std::mem::take(&mut field));
                    fresh = true;
                }
                _ => {
                    field.push(c);
                    fresh = false;
                }
            }
        }

        if in_quotes && multiline {
            field.push('\n');
            continue;
        }
        fields.push(field);
        return Some((fields, number + 1));
    }

    None
}

fn row_to_task(fields: &[String]) -> Option<Task> {
    if fields.len() < MIN_FIELDS {
        return None;
    }
    let field = |index: usize| fields.get(index).map_or("", |f| f.trim());

    let name = non_empty(field(1)).unwrap_or(UNTITLED_TASK).to_string();
    let id = non_empty(field(0)).map_or_else(|| generate_task_id(&name), str::to_string);

    Some(Task {
        id,
        name,
        category: normalize_category(field(2)),
        start_date: parse_date(field(3)),
        end_date: parse_date(field(4)),
        status: Status::from_str(field(5)).unwrap_or_default(),
        initial_cost: parse_cost(field(6)),
        actual_cost: parse_cost(field(7)),
        dependencies: parse_dependencies(field(8)),
        notes: field(9).to_string(),
        important: matches!(field(10).to_lowercase().as_str(), "yes" | "true"),
    })
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

/// The leading number of `value`, so `500 USD` reads as 500.
fn parse_cost(value: &str) -> f64 {
    COST_PREFIX
        .find(value)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn parse_dependencies(value: &str) -> Vec<String> {
    value.split(',').map(str::trim).filter(|dep| !dep.is_empty()).map(str::to_string).collect()
}

/// An importable example file: the header plus one sample row.
///
/// The sample row has a blank ID so that importing it generates a fresh one.
#[must_use]
pub fn csv_template() -> String {
    let sample = Task {
        id: String::new(),
        name: "Book the venue".to_string(),
        category: "Venue".to_string(),
        start_date: NaiveDate::from_ymd_opt(2025, 1, 6),
        end_date: NaiveDate::from_ymd_opt(2025, 1, 31),
        status: Status::NotStarted,
        initial_cost: 5000.0,
        actual_cost: 0.0,
        dependencies: Vec::new(),
        notes: "Confirm the deposit amount".to_string(),
        important: true,
    };
    tasks_to_csv(&[sample])
}
