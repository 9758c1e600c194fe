//! Integration tests for `wedding_planner`.

use chrono::NaiveDate;
use proptest::prelude::*;
use tempfile::TempDir;
use wedding_planner::config::PlannerConfig;
use wedding_planner::gantt::GanttMode;
use wedding_planner::storage::{self, local::LocalTaskStore};
use wedding_planner::tasks::csv::{parse_csv, tasks_to_csv};
use wedding_planner::tasks::models::KNOWN_CATEGORIES;
use wedding_planner::{Backend, Planner, Status, Task, TaskGateway, VERSION};

#[test]
fn test_version_exists() {
    assert!(!VERSION.is_empty());
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

const IMPORT: &str = "\
ID,Task Name,Category,Start Date,End Date,Status,Initial Cost,Actual Cost,Dependencies,Notes,Important
venue,Book the venue,venue,2024-03-01,2024-03-10,Completed,5000,5100,,Deposit paid,Yes
cake,Order cake,Catering,2024-05-01,2024-05-20,In Progress,300,0,venue,,No
dress,Dress fitting,Attire,2024-04-01,2024-04-15,Not Started,1200,0,,,No
music,Find a band,Music,,,Not Started,800,0,,,No
";

#[test]
fn test_planner_round_trip_through_local_store() {
    let dir = TempDir::new().unwrap();
    let store = LocalTaskStore::new(dir.path().join("tasks.json"));
    let today = date(2024, 5, 10);

    {
        let mut planner = Planner::load(&store).unwrap();
        let summary = planner.import_csv(IMPORT).unwrap();
        assert_eq!(summary.imported, 4);
        assert_eq!(summary.added, 4);
    }

    let planner = Planner::load(&store).unwrap();
    assert_eq!(planner.backend(), Backend::Local);
    assert_eq!(planner.tasks().len(), 4);

    let venue = planner.get("venue").unwrap();
    assert_eq!(venue.category, "Venue");
    assert_eq!(venue.display_status(today), Status::Completed);

    let dress = planner.get("dress").unwrap();
    assert_eq!(dress.display_status(today), Status::Delayed);

    let overview = planner.gantt(GanttMode::Overview, today);
    assert_eq!(overview.rows.len(), 3);
    assert_eq!(overview.hidden_count, 1);
    let window = overview.window.unwrap();
    assert_eq!(window.start, date(2024, 2, 23));
    assert_eq!(window.end, date(2024, 5, 27));

    let summary = planner.summary(today, today.and_hms_opt(12, 0, 0).unwrap());
    assert_eq!(summary.task_count, 4);
    assert_eq!(summary.completed_count, 1);
    assert!((summary.total_initial_cost - 7300.0).abs() < 1e-9);

    assert_eq!(parse_csv(&planner.export_csv()), planner.tasks().to_vec());
}

#[test]
fn test_connect_falls_back_to_local_store() {
    let dir = TempDir::new().unwrap();
    let config = PlannerConfig {
        database_path: Some(dir.path().join("absent.db")),
        create_database: false,
        local_store_path: Some(dir.path().join("tasks.json")),
        ..PlannerConfig::default()
    };

    let gateway = storage::connect(&config, dir.path()).unwrap();
    assert_eq!(gateway.backend(), Backend::Local);

    let task = Task::new("venue", "Book the venue");
    gateway.save_task(&task, true).unwrap();
    assert_eq!(gateway.fetch_tasks().unwrap(), vec![task]);
}

#[test]
fn test_connect_uses_database_when_available() {
    let dir = TempDir::new().unwrap();
    let config = PlannerConfig {
        database_path: Some(dir.path().join("planner.db")),
        create_database: true,
        local_store_path: Some(dir.path().join("tasks.json")),
        ..PlannerConfig::default()
    };

    let gateway = storage::connect(&config, dir.path()).unwrap();
    assert_eq!(gateway.backend(), Backend::Database);

    let mut planner = Planner::load(gateway.as_ref()).unwrap();
    planner.import_csv(IMPORT).unwrap();
    drop(planner);

    let reopened = storage::connect(&config, dir.path()).unwrap();
    let tasks = reopened.fetch_tasks().unwrap();
    assert_eq!(tasks.len(), 4);
    assert_eq!(tasks[1].dependencies, vec!["venue".to_string()]);
    assert!(!dir.path().join("tasks.json").exists());
}

fn arb_date() -> impl Strategy<Value = Option<NaiveDate>> {
    prop::option::of((2020i32..2030, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| date(y, m, d)))
}

fn arb_status() -> impl Strategy<Value = Status> {
    prop::sample::select(vec![Status::NotStarted, Status::InProgress, Status::Completed, Status::Delayed])
}

fn arb_cost() -> impl Strategy<Value = f64> {
    (-1_000_000i64..10_000_000).prop_map(|cents| cents as f64 / 100.0)
}

fn arb_task() -> impl Strategy<Value = Task> {
    (
        "[a-z][a-z0-9-]{0,12}",
        "[A-Za-z][A-Za-z ,\"]{0,20}[A-Za-z]",
        prop::sample::select(KNOWN_CATEGORIES.to_vec()),
        arb_date(),
        arb_date(),
        arb_status(),
        arb_cost(),
        arb_cost(),
        prop::collection::vec("[a-z][a-z0-9-]{0,8}", 0..3),
        "[A-Za-z0-9 ,.\"\n]{0,30}".prop_map(|notes| notes.trim().to_string()),
        any::<bool>(),
    )
        .prop_map(
            |(id, name, category, start_date, end_date, status, initial_cost, actual_cost, dependencies, notes, important)| {
                Task {
                    id,
                    name,
                    category: category.to_string(),
                    start_date,
                    end_date,
                    status,
                    initial_cost,
                    actual_cost,
                    dependencies,
                    notes,
                    important,
                }
            },
        )
}

proptest! {
    #[test]
    fn csv_export_is_reimportable(tasks in prop::collection::vec(arb_task(), 0..6)) {
        let csv = tasks_to_csv(&tasks);
        prop_assert_eq!(parse_csv(&csv), tasks);
    }

    #[test]
    fn parse_csv_never_panics(text in "[a-zA-Z0-9,\"\r\n -]{0,200}") {
        for task in parse_csv(&text) {
            prop_assert!(!task.id.is_empty());
            prop_assert!(!task.name.is_empty());
            prop_assert!(task.initial_cost.is_finite());
        }
    }
}
