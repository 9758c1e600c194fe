//! CLI binary for `wedding_planner`.
//!
//! This binary is a thin wrapper that parses arguments, sets up logging and
//! delegates to the library.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use wedding_planner::cli::{Cli, Session};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(error) = init_tracing(cli.quiet, cli.verbose) {
        eprintln!("{error}");
    }

    let project_dir = cli
        .project
        .unwrap_or_else(|| env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    if let Err(error) = wedding_planner::templates::init_for_project(&project_dir) {
        eprintln!("{error}");
    }
    let session = Session::current(project_dir);

    let output = wedding_planner::cli::run(cli.command, &session);

    for msg in output.stdout {
        println!("{msg}");
    }
    for msg in output.stderr {
        eprintln!("{msg}");
    }

    output.exit_code
}

/// Log to stderr. `WEDDING_PLANNER_LOG` overrides the level chosen by flags.
fn init_tracing(quiet: bool, verbose: bool) -> Result<(), String> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("WEDDING_PLANNER_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| format!("failed to initialize tracing subscriber: {error}"))
}
