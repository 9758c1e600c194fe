//! Command execution for the CLI.
//!
//! This module handles running CLI commands and producing output.

use crate::cli::{Command, TaskFields};
use crate::color::category_color;
use crate::config::{self, PlannerConfig};
use crate::gantt::{BarTone, GanttLayout, GanttMode, GanttRow};
use crate::planner::{Planner, TaskFilter};
use crate::storage;
use crate::summary::BudgetSummary;
use crate::tasks::csv::csv_template;
use crate::tasks::models::{normalize_category, Status, Task};
use crate::tasks::status::{is_active_today, is_delayed, is_due_soon, parse_date};
use crate::templates;
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tera::Context;

/// Output from running the CLI, with separate stdout and stderr messages.
#[derive(Debug)]
pub struct CliOutput {
    /// Exit code for the process.
    pub exit_code: ExitCode,
    /// Messages to print to stdout.
    pub stdout: Vec<String>,
    /// Messages to print to stderr.
    pub stderr: Vec<String>,
}

/// Where and when a command runs.
#[derive(Debug, Clone)]
pub struct Session {
    /// Project root; config and relative paths resolve against it.
    pub project_dir: PathBuf,
    /// Current local date.
    pub today: NaiveDate,
    /// Current local time.
    pub now: NaiveDateTime,
}

impl Session {
    /// A session in `project_dir` at the current local time.
    #[must_use]
    pub fn current(project_dir: PathBuf) -> Self {
        let now = Local::now().naive_local();
        Self { project_dir, today: now.date(), now }
    }
}

/// Width of the text Gantt chart, in characters.
const GANTT_TEXT_WIDTH: usize = 60;

/// Run a CLI command.
pub fn run(command: Command, session: &Session) -> CliOutput {
    match command {
        Command::Version => run_version(),
        Command::Template => success_output(csv_template()),
        Command::Color { category } => success_output(category_color(&category)),
        Command::Init => run_init(session),
        Command::List { category, status, delayed, due_soon, important } => {
            let status = match status.as_deref().map(Status::from_str).transpose() {
                Ok(status) => status,
                Err(e) => return error_output(e.to_string()),
            };
            let filter = TaskFilter { category, status, delayed, due_soon, important };
            with_planner(session, |planner, _| run_list(planner, &filter, session))
        }
        Command::Show { id } => with_planner(session, |planner, _| run_show(planner, &id, session)),
        Command::Add { name, fields } => {
            with_planner(session, |planner, _| run_add(planner, name, &fields))
        }
        Command::Update { id, name, fields } => {
            with_planner(session, |planner, _| run_update(planner, &id, name, &fields))
        }
        Command::Delete { id } => with_planner(session, |planner, _| run_delete(planner, &id)),
        Command::Import { file } => {
            let file = session.project_dir.join(file);
            with_planner(session, |planner, _| run_import(planner, &file))
        }
        Command::Export { output } => {
            let output = output.map(|path| session.project_dir.join(path));
            with_planner(session, |planner, _| run_export(planner, output))
        }
        Command::Gantt { category, text } => {
            with_planner(session, |planner, _| run_gantt(planner, category.as_deref(), text, session))
        }
        Command::Summary { json } => {
            with_planner(session, |planner, config| run_summary(planner, config, json, session))
        }
        Command::Backend => with_planner(session, |planner, _| success_output(planner.backend().to_string())),
    }
}

/// Load the config, open the store and the collection, then run `f`.
fn with_planner(
    session: &Session,
    f: impl FnOnce(&mut Planner<'_>, &PlannerConfig) -> CliOutput,
) -> CliOutput {
    let config = match PlannerConfig::load_from(&session.project_dir) {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => return error_output(format!("Error loading config: {e}")),
    };
    let gateway = match storage::connect(&config, &session.project_dir) {
        Ok(gateway) => gateway,
        Err(e) => return error_output(format!("Error opening task store: {e}")),
    };
    let mut planner = match Planner::load(gateway.as_ref()) {
        Ok(planner) => planner,
        Err(e) => return error_output(format!("Error loading tasks: {e}")),
    };
    f(&mut planner, &config)
}

// === Utility Commands ===

fn run_version() -> CliOutput {
    success_output(format!("wedding-planner v{}", crate::VERSION))
}

fn run_init(session: &Session) -> CliOutput {
    match config::ensure_config_in(&session.project_dir) {
        Ok(config) => {
            let mut messages = vec![format!("Config ensured at {}", config::CONFIG_FILE_PATH)];
            match &config.database_path {
                Some(path) => messages.push(format!("  database_path: {}", path.display())),
                None => messages.push("  database_path: (none, local store only)".to_string()),
            }
            messages.push(format!("  currency: {}", config.currency));
            CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![], stderr: messages }
        }
        Err(e) => error_output(format!("Error ensuring config: {e}")),
    }
}

// === Task Commands ===

/// A task with the flags list views show next to it.
#[derive(Debug, Serialize)]
struct TaskView<'a> {
    #[serde(flatten)]
    task: &'a Task,
    display_status: Status,
    delayed: bool,
    due_soon: bool,
    active: bool,
    color: String,
}

impl<'a> TaskView<'a> {
    fn new(task: &'a Task, session: &Session) -> Self {
        Self {
            task,
            display_status: task.display_status(session.today),
            delayed: is_delayed(task, session.today),
            due_soon: is_due_soon(task, session.today),
            active: is_active_today(task, session.now),
            color: category_color(&task.category),
        }
    }
}

fn run_list(planner: &Planner<'_>, filter: &TaskFilter, session: &Session) -> CliOutput {
    let views: Vec<TaskView<'_>> =
        planner.filter(filter, session.today).into_iter().map(|t| TaskView::new(t, session)).collect();
    json_output(&views)
}

fn run_show(planner: &Planner<'_>, id: &str, session: &Session) -> CliOutput {
    match planner.get(id) {
        Some(task) => json_output(&TaskView::new(task, session)),
        None => error_output(format!("Task not found: {id}")),
    }
}

fn run_add(planner: &mut Planner<'_>, name: String, fields: &TaskFields) -> CliOutput {
    let mut task = Task::new(planner.new_task_id(&name), name);
    if let Err(message) = apply_fields(&mut task, fields) {
        return error_output(message);
    }
    match planner.save(task) {
        Ok(stored) => json_output(&stored),
        Err(e) => error_output(format!("Error adding task: {e}")),
    }
}

fn run_update(
    planner: &mut Planner<'_>,
    id: &str,
    name: Option<String>,
    fields: &TaskFields,
) -> CliOutput {
    let Some(mut task) = planner.get(id).cloned() else {
        return error_output(format!("Task not found: {id}"));
    };
    if let Some(name) = name {
        task.name = name;
    }
    if let Err(message) = apply_fields(&mut task, fields) {
        return error_output(message);
    }
    match planner.save(task) {
        Ok(stored) => json_output(&stored),
        Err(e) => error_output(format!("Error updating task: {e}")),
    }
}

fn run_delete(planner: &mut Planner<'_>, id: &str) -> CliOutput {
    match planner.delete(id) {
        Ok(task) => success_output(format!("Deleted task {} ({})", task.id, task.name)),
        Err(e) => error_output(format!("Error deleting task: {e}")),
    }
}

/// Copy the given fields onto `task`, validating dates and status.
fn apply_fields(task: &mut Task, fields: &TaskFields) -> Result<(), String> {
    if let Some(category) = &fields.category {
        task.category = normalize_category(category);
    }
    if let Some(start) = &fields.start {
        task.start_date = parse_optional_date(start)?;
    }
    if let Some(end) = &fields.end {
        task.end_date = parse_optional_date(end)?;
    }
    if let Some(status) = &fields.status {
        task.status = Status::from_str(status).map_err(|e| e.to_string())?;
    }
    if let Some(cost) = fields.initial_cost {
        task.initial_cost = cost;
    }
    if let Some(cost) = fields.actual_cost {
        task.actual_cost = cost;
    }
    if let Some(deps) = &fields.depends_on {
        task.dependencies =
            deps.iter().map(|d| d.trim()).filter(|d| !d.is_empty()).map(str::to_string).collect();
    }
    if let Some(notes) = &fields.notes {
        task.notes.clone_from(notes);
    }
    if let Some(important) = fields.important {
        task.important = important;
    }
    Ok(())
}

fn parse_optional_date(raw: &str) -> Result<Option<NaiveDate>, String> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_date(raw).map(Some).ok_or_else(|| format!("invalid date: '{raw}' (expected YYYY-MM-DD)"))
}

// === Import / Export ===

fn run_import(planner: &mut Planner<'_>, file: &std::path::Path) -> CliOutput {
    let summary = match planner.import_file(file) {
        Ok(summary) => summary,
        Err(e) => return error_output(format!("Error importing tasks: {e}")),
    };

    let mut ctx = Context::new();
    ctx.insert("imported", &summary.imported);
    ctx.insert("added", &summary.added);
    ctx.insert("replaced", &summary.replaced);
    render_output(templates::IMPORT_RESULT, &ctx)
}

fn run_export(planner: &Planner<'_>, output: Option<PathBuf>) -> CliOutput {
    let csv = planner.export_csv();
    let Some(path) = output else {
        return success_output(csv);
    };
    match std::fs::write(&path, csv) {
        Ok(()) => success_output(format!(
            "Exported {} task(s) to {}",
            planner.tasks().len(),
            path.display()
        )),
        Err(e) => error_output(format!("Error writing {}: {e}", path.display())),
    }
}

// === Reports ===

fn run_gantt(planner: &Planner<'_>, category: Option<&str>, text: bool, session: &Session) -> CliOutput {
    let mode = category.map_or(GanttMode::Overview, GanttMode::DrillDown);
    let layout = planner.gantt(mode, session.today);
    if !text {
        return json_output(&layout);
    }
    render_output(templates::GANTT, &gantt_context(&layout, category))
}

/// One line of the text chart.
#[derive(Debug, Serialize)]
struct TextRow {
    label: String,
    bar: String,
    start: String,
    end: String,
    task_count: usize,
}

fn gantt_context(layout: &GanttLayout, category: Option<&str>) -> Context {
    let label_width = layout.rows.iter().map(|r| r.label.chars().count()).max().unwrap_or(0);
    let rows: Vec<TextRow> = layout
        .rows
        .iter()
        .map(|row| TextRow {
            label: format!("{:<label_width$}", row.label),
            bar: text_bar(row),
            start: row.start.format("%Y-%m-%d").to_string(),
            end: row.end.format("%Y-%m-%d").to_string(),
            task_count: row.task_count,
        })
        .collect();

    let mut ctx = Context::new();
    ctx.insert("title", category.unwrap_or("All categories"));
    if let Some(window) = layout.window {
        ctx.insert("start", &window.start.format("%Y-%m-%d").to_string());
        ctx.insert("end", &window.end.format("%Y-%m-%d").to_string());
        ctx.insert("total_days", &window.total_days);
    }
    ctx.insert("rows", &rows);
    ctx.insert("hidden_count", &layout.hidden_count);
    ctx
}

fn text_bar(row: &GanttRow) -> String {
    let start = cells(row.offset_pct).min(GANTT_TEXT_WIDTH - 1);
    let len = cells(row.width_pct).clamp(1, GANTT_TEXT_WIDTH - start);
    let fill = match row.tone {
        BarTone::Delayed => "!",
        BarTone::Completed => "=",
        BarTone::InProgress => "~",
        BarTone::Default => "#",
    };
    format!(
        "{}{}{}",
        " ".repeat(start),
        fill.repeat(len),
        " ".repeat(GANTT_TEXT_WIDTH - start - len)
    )
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn cells(pct: f64) -> usize {
    (pct.max(0.0) / 100.0 * GANTT_TEXT_WIDTH as f64).round() as usize
}

fn run_summary(planner: &Planner<'_>, config: &PlannerConfig, json: bool, session: &Session) -> CliOutput {
    let summary = planner.summary(session.today, session.now);
    if json {
        return json_output(&summary);
    }
    render_output(templates::SUMMARY, &summary_context(&summary, &config.currency))
}

/// Category line with amounts pre-formatted.
#[derive(Debug, Serialize)]
struct CategoryLine {
    category: String,
    task_count: usize,
    initial: String,
    actual: String,
}

fn summary_context(summary: &BudgetSummary, currency: &str) -> Context {
    let categories: Vec<CategoryLine> = summary
        .categories
        .iter()
        .map(|line| CategoryLine {
            category: line.category.clone(),
            task_count: line.task_count,
            initial: money(line.initial_cost),
            actual: money(line.actual_cost),
        })
        .collect();

    let mut ctx = Context::new();
    ctx.insert("currency", currency);
    ctx.insert("task_count", &summary.task_count);
    ctx.insert("completed_count", &summary.completed_count);
    ctx.insert("completion_pct", &format!("{:.1}", summary.completion_pct));
    ctx.insert("total_initial", &money(summary.total_initial_cost));
    ctx.insert("total_actual", &money(summary.total_actual_cost));
    ctx.insert("variance", &money(summary.variance));
    ctx.insert("over_budget", &summary.over_budget());
    ctx.insert("delayed_count", &summary.delayed_count);
    ctx.insert("due_soon_count", &summary.due_soon_count);
    ctx.insert("active_count", &summary.active_count);
    ctx.insert("important_count", &summary.important_count);
    ctx.insert("categories", &categories);
    ctx
}

fn money(amount: f64) -> String {
    format!("{amount:.2}")
}

// === Helper Functions ===

fn render_output(template: &str, ctx: &Context) -> CliOutput {
    match templates::render(template, ctx) {
        Ok(text) => success_output(text.trim_end().to_string()),
        Err(e) => error_output(e.to_string()),
    }
}

fn json_output<T: Serialize>(value: &T) -> CliOutput {
    match serde_json::to_string_pretty(value) {
        Ok(json) => CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![json], stderr: vec![] },
        Err(e) => error_output(e.to_string()),
    }
}

fn success_output(message: String) -> CliOutput {
    CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![message], stderr: vec![] }
}

fn error_output(message: String) -> CliOutput {
    CliOutput { exit_code: ExitCode::from(1), stdout: vec![], stderr: vec![message] }
}
