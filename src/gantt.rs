//! Gantt chart layout.
//!
//! Converts scheduled tasks into percentage offsets and widths over a chart
//! window that pads the earliest start and latest end by a week on each side.
//! Two modes are supported: an overview with one bar per category, and a
//! drill-down showing the individual tasks of one category.

use crate::color::category_color;
use crate::tasks::models::{Status, Task};
use crate::tasks::status::{days_between, is_delayed};
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// Days of padding before the first start and after the last end.
pub const CHART_PADDING_DAYS: i64 = 7;

/// Narrowest bar drawn, in percent of the chart width.
pub const MIN_BAR_WIDTH_PCT: f64 = 0.5;

/// Bar colour for delayed work.
pub const ALERT_COLOR: &str = "#EF4444";
/// Bar colour for completed work.
pub const SUCCESS_COLOR: &str = "#10B981";
/// Bar colour for work in progress.
pub const WARNING_COLOR: &str = "#F59E0B";
/// Bar colour for individual tasks with nothing to flag.
pub const NEUTRAL_COLOR: &str = "#94A3B8";

/// What the chart shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GanttMode<'a> {
    /// One row per category.
    Overview,
    /// One row per task in the named category.
    DrillDown(&'a str),
}

/// Visual state of a bar, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BarTone {
    /// Behind schedule.
    Delayed,
    /// Finished; drawn dimmed.
    Completed,
    /// Under way.
    InProgress,
    /// Nothing to flag.
    Default,
}

impl BarTone {
    fn color(self) -> Option<&'static str> {
        match self {
            Self::Delayed => Some(ALERT_COLOR),
            Self::Completed => Some(SUCCESS_COLOR),
            Self::InProgress => Some(WARNING_COLOR),
            Self::Default => None,
        }
    }
}

/// The padded date range of the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartWindow {
    /// First day shown.
    pub start: NaiveDate,
    /// Last day shown.
    pub end: NaiveDate,
    /// Inclusive number of days shown.
    pub total_days: u32,
}

/// A month segment of the header ruler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSegment {
    /// Label such as `Mar 2024`.
    pub label: String,
    /// Days of this month inside the window.
    pub days: u32,
    /// Share of the chart width, in percent.
    pub width_pct: f64,
}

/// One bar of the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GanttRow {
    /// Category name (overview) or task ID (drill-down).
    pub key: String,
    /// Text shown next to the bar.
    pub label: String,
    /// First day of the bar.
    pub start: NaiveDate,
    /// Last day of the bar.
    pub end: NaiveDate,
    /// Tasks represented by this bar.
    pub task_count: usize,
    /// Left edge, in percent of the chart width.
    pub offset_pct: f64,
    /// Bar width, in percent of the chart width.
    pub width_pct: f64,
    /// Visual state.
    pub tone: BarTone,
    /// Fill colour.
    pub color: String,
    /// Whether the bar is drawn faded.
    pub dimmed: bool,
}

/// Computed chart layout.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GanttLayout {
    /// Chart range, absent when nothing is scheduled.
    pub window: Option<ChartWindow>,
    /// Month ruler segments, left to right.
    pub months: Vec<MonthSegment>,
    /// Bars, top to bottom.
    pub rows: Vec<GanttRow>,
    /// Position of the today marker, when today is inside the window.
    pub today_offset_pct: Option<f64>,
    /// Tasks in scope left out because a date is missing.
    pub hidden_count: usize,
}

/// A row before positioning.
struct Span {
    key: String,
    label: String,
    start: NaiveDate,
    end: NaiveDate,
    task_count: usize,
    tone: BarTone,
    default_color: String,
}

/// Lay out the chart for `tasks`.
///
/// Tasks without both dates are skipped and counted in
/// [`GanttLayout::hidden_count`]. In drill-down mode only tasks of the chosen
/// category (matched ignoring case) are considered at all.
#[must_use]
pub fn layout(tasks: &[Task], mode: GanttMode<'_>, today: NaiveDate) -> GanttLayout {
    let in_scope: Vec<&Task> = match mode {
        GanttMode::Overview => tasks.iter().collect(),
        GanttMode::DrillDown(category) => {
            tasks.iter().filter(|t| t.category.eq_ignore_ascii_case(category.trim())).collect()
        }
    };
    let scheduled: Vec<&Task> = in_scope.iter().copied().filter(|t| t.is_scheduled()).collect();
    let hidden_count = in_scope.len() - scheduled.len();

    let spans = match mode {
        GanttMode::Overview => category_spans(&scheduled, today),
        GanttMode::DrillDown(_) => task_spans(&scheduled, today),
    };

    let Some(window) = chart_window(&spans) else {
        return GanttLayout { hidden_count, ..GanttLayout::default() };
    };

    let rows = spans.into_iter().map(|span| position(span, window)).collect();
    let today_offset_pct = (window.start <= today && today <= window.end)
        .then(|| percent(days_between(Some(window.start), Some(today)), window.total_days));

    GanttLayout { window: Some(window), months: month_ruler(window), rows, today_offset_pct, hidden_count }
}

fn category_spans(tasks: &[&Task], today: NaiveDate) -> Vec<Span> {
    let mut groups: BTreeMap<&str, Vec<&Task>> = BTreeMap::new();
    for task in tasks {
        groups.entry(task.category.as_str()).or_default().push(task);
    }

    let mut spans: Vec<Span> = groups
        .into_iter()
        .filter_map(|(category, members)| {
            let start = members.iter().filter_map(|t| t.start_date).min()?;
            let end = members.iter().filter_map(|t| t.end_date).max()?;
            Some(Span {
                key: category.to_string(),
                label: category.to_string(),
                start,
                end,
                task_count: members.len(),
                tone: group_tone(&members, today),
                default_color: category_color(category),
            })
        })
        .collect();

    // BTreeMap order makes ties fall back to the category name.
    spans.sort_by_key(|span| span.start);
    spans
}

fn task_spans(tasks: &[&Task], today: NaiveDate) -> Vec<Span> {
    let mut spans: Vec<Span> = tasks
        .iter()
        .filter_map(|task| {
            Some(Span {
                key: task.id.clone(),
                label: task.name.clone(),
                start: task.start_date?,
                end: task.end_date?,
                task_count: 1,
                tone: task_tone(task, today),
                default_color: NEUTRAL_COLOR.to_string(),
            })
        })
        .collect();
    spans.sort_by_key(|span| span.start);
    spans
}

fn task_tone(task: &Task, today: NaiveDate) -> BarTone {
    if is_delayed(task, today) {
        BarTone::Delayed
    } else if task.status == Status::Completed {
        BarTone::Completed
    } else if task.status == Status::InProgress {
        BarTone::InProgress
    } else {
        BarTone::Default
    }
}

fn group_tone(members: &[&Task], today: NaiveDate) -> BarTone {
    if members.iter().any(|t| is_delayed(t, today)) {
        BarTone::Delayed
    } else if members.iter().all(|t| t.status == Status::Completed) {
        BarTone::Completed
    } else if members.iter().any(|t| t.status == Status::InProgress) {
        BarTone::InProgress
    } else {
        BarTone::Default
    }
}

fn chart_window(spans: &[Span]) -> Option<ChartWindow> {
    let earliest = spans.iter().map(|s| s.start.min(s.end)).min()?;
    let latest = spans.iter().map(|s| s.end.max(s.start)).max()?;
    let start = earliest - Duration::days(CHART_PADDING_DAYS);
    let end = latest + Duration::days(CHART_PADDING_DAYS);
    Some(ChartWindow { start, end, total_days: days_between(Some(start), Some(end)) })
}

fn position(span: Span, window: ChartWindow) -> GanttRow {
    let offset_pct = percent(days_between(Some(window.start), Some(span.start)), window.total_days);
    let width_pct = percent(days_between(Some(span.start), Some(span.end)), window.total_days)
        .max(MIN_BAR_WIDTH_PCT);
    let color = span.tone.color().map_or(span.default_color, str::to_string);

    GanttRow {
        key: span.key,
        label: span.label,
        start: span.start,
        end: span.end,
        task_count: span.task_count,
        offset_pct,
        width_pct,
        tone: span.tone,
        color,
        dimmed: span.tone == BarTone::Completed,
    }
}

fn percent(days: u32, total_days: u32) -> f64 {
    if total_days == 0 {
        return 0.0;
    }
    f64::from(days) / f64::from(total_days) * 100.0
}

fn month_ruler(window: ChartWindow) -> Vec<MonthSegment> {
    let mut segments = Vec::new();
    let mut month_start = first_of_month(window.start);

    while month_start <= window.end {
        let next_month = first_of_next_month(month_start);
        let month_end = next_month - Duration::days(1);
        let from = month_start.max(window.start);
        let to = month_end.min(window.end);
        let days = days_between(Some(from), Some(to));

        segments.push(MonthSegment {
            label: month_start.format("%b %Y").to_string(),
            days,
            width_pct: percent(days, window.total_days),
        });
        month_start = next_month;
    }

    segments
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 { (date.year() + 1, 1) } else { (date.year(), date.month() + 1) };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX)
}
