//! Command-line interface for wedding-planner.
//!
//! Every command runs against the store chosen by the project config and
//! returns its output as a [`CliOutput`] value; the binary only prints it.

mod run;


pub use run::{run, CliOutput, Session};

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Wedding planner - tasks, budget, CSV import/export and Gantt layout.
///
/// Data commands print JSON; reports print plain text.
#[derive(Parser, Debug)]
#[command(name = "wedding-planner")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Show debug logging on stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Project directory (defaults to the current directory)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List tasks, optionally filtered.
    List {
        /// Only tasks in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Only tasks with this stored status (e.g. "in progress")
        #[arg(short, long)]
        status: Option<String>,

        /// Only delayed tasks
        #[arg(long)]
        delayed: bool,

        /// Only tasks due within the next week
        #[arg(long)]
        due_soon: bool,

        /// Only important tasks
        #[arg(long)]
        important: bool,
    },

    /// Show one task.
    Show {
        /// Task ID
        id: String,
    },

    /// Add a task.
    Add {
        /// Task name
        name: String,

        #[command(flatten)]
        fields: TaskFields,
    },

    /// Update a task. Only the given fields change.
    Update {
        /// Task ID
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        fields: TaskFields,
    },

    /// Delete a task.
    Delete {
        /// Task ID
        id: String,
    },

    /// Import tasks from a CSV file.
    ///
    /// Rows whose ID matches an existing task replace it; other rows are
    /// added. Rows with fewer than five columns are skipped.
    Import {
        /// CSV file to import
        file: PathBuf,
    },

    /// Export all tasks as CSV.
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print an importable CSV template.
    Template,

    /// Lay out the Gantt chart.
    ///
    /// Without `--category` one bar is drawn per category.
    Gantt {
        /// Show the tasks of one category
        #[arg(short, long)]
        category: Option<String>,

        /// Draw a text chart instead of printing the layout as JSON
        #[arg(long)]
        text: bool,
    },

    /// Show budget totals and status counts.
    Summary {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the display colour of a category.
    Color {
        /// Category name
        category: String,
    },

    /// Print which store is in use.
    Backend,

    /// Write the default config file if there is none.
    Init,

    /// Show version information.
    Version,
}

/// Task fields settable from the command line.
#[derive(Args, Debug, Clone, Default)]
pub struct TaskFields {
    /// Category (known categories are matched ignoring case)
    #[arg(long)]
    pub category: Option<String>,

    /// Start date, YYYY-MM-DD; empty to clear
    #[arg(long)]
    pub start: Option<String>,

    /// End date, YYYY-MM-DD; empty to clear
    #[arg(long)]
    pub end: Option<String>,

    /// Status: "not started", "in progress", "completed" or "delayed"
    #[arg(long)]
    pub status: Option<String>,

    /// Budgeted cost
    #[arg(long, allow_negative_numbers = true)]
    pub initial_cost: Option<f64>,

    /// Actual cost
    #[arg(long, allow_negative_numbers = true)]
    pub actual_cost: Option<f64>,

    /// Comma-separated IDs of tasks this one depends on
    #[arg(long, value_delimiter = ',')]
    pub depends_on: Option<Vec<String>>,

    /// Free-text notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Mark as important (true/false)
    #[arg(long)]
    pub important: Option<bool>,
}
