//! Where planner data lives on disk.
//!
//! Each project gets its own directory under `~/.wedding-planner/planners/`,
//! named after the project folder plus a hash of its full path.

use crate::tasks::id::slugify;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// The base directory name for wedding-planner data.
const DATA_DIR_NAME: &str = ".wedding-planner";

/// The local store filename.
pub const LOCAL_STORE_FILENAME: &str = "tasks.json";

/// `~/.wedding-planner/`, or `None` without a home directory.
#[must_use]
pub fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DATA_DIR_NAME))
}

/// `~/.wedding-planner/planners/<folder>-<hash>/` for `project_dir`.
#[must_use]
pub fn project_data_dir(project_dir: &Path) -> Option<PathBuf> {
    Some(data_dir()?.join("planners").join(planner_dir_name(project_dir)))
}

/// Default location of the local task store for a project.
///
/// Falls back to `<project>/.wedding-planner/tasks.json` when there is no
/// home directory.
#[must_use]
pub fn local_store_path(project_dir: &Path) -> PathBuf {
    project_data_dir(project_dir)
        .unwrap_or_else(|| project_dir.join(DATA_DIR_NAME))
        .join(LOCAL_STORE_FILENAME)
}

/// e.g. `our-wedding-a1b2c3d4e5f60718`
fn planner_dir_name(project_dir: &Path) -> String {
    let resolved = project_dir.canonicalize().unwrap_or_else(|_| project_dir.to_path_buf());

    let folder = resolved.file_name().map(|n| slugify(&n.to_string_lossy())).unwrap_or_default();
    let folder = if folder.is_empty() { "planner".to_string() } else { folder };

    let mut hasher = DefaultHasher::new();
    resolved.hash(&mut hasher);
    format!("{folder}-{:016x}", hasher.finish())
}
