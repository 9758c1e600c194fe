//! Configuration management for wedding-planner.
//!
//! This module handles the `.wedding-planner/config.yaml` file which stores
//! project-specific settings: where the task database lives, whether it may
//! be created, where the local fallback store lives and which currency to
//! show amounts in.

use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file path relative to project root.
pub const CONFIG_FILE_PATH: &str = ".wedding-planner/config.yaml";

/// Currency used when none is configured.
pub const DEFAULT_CURRENCY: &str = "USD";

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Project configuration for the planner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlannerConfig {
    /// Path to the `SQLite` task database, relative to the project root
    /// unless absolute. None means no database; the local store is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// Whether a missing database file may be created on startup.
    #[serde(default)]
    pub create_database: bool,

    /// Path to the local JSON store. Defaults to the project data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_store_path: Option<PathBuf>,

    /// Currency code shown next to amounts.
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            create_database: false,
            local_store_path: None,
            currency: default_currency(),
        }
    }
}

impl PlannerConfig {
    /// Load config from the default location, returning None if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load() -> Result<Option<Self>> {
        Self::load_from(Path::new("."))
    }

    /// Load config from a specific base directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_from(base_dir: &Path) -> Result<Option<Self>> {
        let config_path = Self::config_path(base_dir);
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(Some(config))
    }

    /// Save config to a specific base directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, base_dir: &Path) -> Result<()> {
        let config_path = Self::config_path(base_dir);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Get the config file path for a base directory.
    #[must_use]
    pub fn config_path(base_dir: &Path) -> PathBuf {
        base_dir.join(CONFIG_FILE_PATH)
    }

    /// The configured database path resolved against `base_dir`.
    #[must_use]
    pub fn resolved_database_path(&self, base_dir: &Path) -> Option<PathBuf> {
        self.database_path.as_deref().map(|path| resolve(base_dir, path))
    }

    /// The local store path resolved against `base_dir`, or the default
    /// location when unset.
    #[must_use]
    pub fn resolved_local_store_path(&self, base_dir: &Path) -> PathBuf {
        self.local_store_path
            .as_deref()
            .map_or_else(|| paths::local_store_path(base_dir), |path| resolve(base_dir, path))
    }
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Ensure config exists in a specific directory.
///
/// Loads the existing file, or writes and returns the default config.
///
/// # Errors
///
/// Returns an error if config cannot be loaded or saved.
pub fn ensure_config_in(base_dir: &Path) -> Result<PlannerConfig> {
    if let Some(config) = PlannerConfig::load_from(base_dir)? {
        return Ok(config);
    }

    let config = PlannerConfig::default();
    config.save_to(base_dir)?;
    tracing::debug!(path = %PlannerConfig::config_path(base_dir).display(), "wrote default config");
    Ok(config)
}
