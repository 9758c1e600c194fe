//! Template loading and rendering using Tera.
//!
//! User-facing text reports are rendered from templates. A project can
//! override any of them by placing a file of the same name under
//! `.wedding-planner/templates/`; embedded defaults fill in the rest.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;
use tera::{Context, Tera};

/// Override directory relative to the project root.
const TEMPLATES_DIR: &str = ".wedding-planner/templates";

/// Dashboard summary.
pub const SUMMARY: &str = "messages/summary.tera";
/// Text Gantt chart.
pub const GANTT: &str = "messages/gantt.tera";
/// Import outcome.
pub const IMPORT_RESULT: &str = "messages/import_result.tera";

/// Embedded default templates for fallback when files don't exist.
static EMBEDDED_TEMPLATES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert(SUMMARY, include_str!("../templates/messages/summary.tera"));
    m.insert(GANTT, include_str!("../templates/messages/gantt.tera"));
    m.insert(IMPORT_RESULT, include_str!("../templates/messages/import_result.tera"));
    m
});

/// Global template engine with caching.
static TERA: Lazy<RwLock<Option<Tera>>> = Lazy::new(|| RwLock::new(None));

/// Initialize the template engine with templates from the specified directory.
///
/// Without a directory, `.wedding-planner/templates` under the current
/// directory is used. A missing directory leaves only the embedded defaults.
///
/// # Errors
///
/// Returns an error if the directory contains invalid templates.
pub fn init_templates(templates_dir: Option<&Path>) -> Result<()> {
    let dir = templates_dir.map_or_else(
        || std::env::current_dir().unwrap_or_default().join(TEMPLATES_DIR),
        Path::to_path_buf,
    );

    let mut tera = Tera::default();

    if dir.exists() {
        let glob_pattern = format!("{}/**/*.tera", dir.display());
        tera = Tera::new(&glob_pattern).map_err(|e| {
            Error::Template(format!("Failed to load templates from {}: {e}", dir.display()))
        })?;
    }

    for (name, content) in EMBEDDED_TEMPLATES.iter() {
        if tera.get_template(name).is_err() {
            tera.add_raw_template(name, content)
                .map_err(|e| Error::Template(format!("Invalid embedded template {name}: {e}")))?;
        }
    }

    *TERA.write().map_err(|e| Error::Template(e.to_string()))? = Some(tera);

    Ok(())
}

/// Initialize the template engine with the overrides of `project_dir`.
///
/// # Errors
///
/// Returns an error if the project's override templates are invalid.
pub fn init_for_project(project_dir: &Path) -> Result<()> {
    init_templates(Some(&project_dir.join(TEMPLATES_DIR)))
}

/// Render a template with the given context.
///
/// Templates are lazy-loaded on first use.
///
/// # Errors
///
/// Returns an error if the template doesn't exist or rendering fails.
pub fn render(name: &str, context: &Context) -> Result<String> {
    let needs_init = TERA.read().map_err(|e| Error::Template(e.to_string()))?.is_none();

    if needs_init {
        init_templates(None)?;
    }

    let guard = TERA.read().map_err(|e| Error::Template(e.to_string()))?;
    let tera = guard.as_ref().ok_or_else(|| Error::Template("Templates not initialized".into()))?;
    let rendered = tera
        .render(name, context)
        .map_err(|e| Error::Template(format!("Failed to render template {name}: {e}")))?;
    drop(guard);

    Ok(rendered)
}

/// Reset the template cache, forcing re-initialization on next use.
///
/// # Errors
///
/// Returns an error if the write lock cannot be acquired.
pub fn reset_cache() -> Result<()> {
    *TERA.write().map_err(|e| Error::Template(e.to_string()))? = None;
    Ok(())
}

/// Get the list of all embedded template names.
#[must_use]
pub fn embedded_template_names() -> Vec<&'static str> {
    EMBEDDED_TEMPLATES.keys().copied().collect()
}
