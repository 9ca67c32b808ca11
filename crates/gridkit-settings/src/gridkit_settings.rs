//! Gridkit Settings
//!
//! Persisted starting values for grids: default page size, the page sizes a
//! host offers, the width of the page window, the URL parameter name and an
//! optional auto-reload interval. [`GridSettings::configure`] applies them to
//! an [`AsyncGridBuilder`].

use anyhow::{Context, Result};
use gridkit_state::{AsyncGridBuilder, DEFAULT_QUERY_PARAM, GridDefaults, PollingRegistry};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[cfg(test)]
mod tests;

pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .context("Could not determine config directory")
        .map(|p| p.join("gridkit"))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Rows per page for a fresh grid
    pub default_limit: usize,
    /// Page sizes offered in a page-size picker
    pub page_size_options: Vec<usize>,
    /// Entries in the page window, fillers included
    pub max_visible_pages: usize,
    /// URL query parameter holding the grid token
    pub query_param: String,
    /// Silent reload period; `None` disables auto-reload
    pub auto_reload_interval_ms: Option<u64>,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            default_limit: 25,
            page_size_options: vec![10, 25, 50, 100],
            max_visible_pages: 7,
            query_param: DEFAULT_QUERY_PARAM.to_string(),
            auto_reload_interval_ms: None,
        }
    }
}

impl GridSettings {
    /// Load from the user config directory, falling back to defaults when no
    /// file exists yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::settings_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::settings_path()?)
    }

    pub fn settings_path() -> Result<PathBuf> {
        config_dir().map(|p| p.join("settings.json"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No settings at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        let settings: Self =
            serde_json::from_str(&content).with_context(|| "Failed to parse settings JSON")?;
        Ok(settings.sanitized())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {:?}", path))?;
        Ok(())
    }

    /// Grid defaults seeded from these settings
    pub fn grid_defaults(&self) -> GridDefaults {
        self.apply_to(GridDefaults::default())
    }

    /// Override the paging fields of `defaults`, keeping its ordering and
    /// filters.
    pub fn apply_to(&self, defaults: GridDefaults) -> GridDefaults {
        GridDefaults {
            limit: self.default_limit.max(1),
            ..defaults
        }
        .with_max_visible_pages(self.max_visible_pages)
        .with_page_sizes(self.page_size_options.iter().copied())
    }

    /// Apply these settings to a grid before it mounts.
    ///
    /// Sets the paging defaults and the query parameter, and registers the
    /// auto-reload under `name` in `registry` when an interval is configured.
    pub fn configure(
        &self,
        builder: AsyncGridBuilder,
        registry: &PollingRegistry,
        name: impl Into<String>,
    ) -> AsyncGridBuilder {
        let builder = builder
            .update_defaults(|defaults| self.apply_to(defaults))
            .query_param(self.query_param.clone());
        match self.auto_reload_interval() {
            Some(interval) => builder.auto_reload(registry, name, interval),
            None => builder,
        }
    }

    pub fn auto_reload_interval(&self) -> Option<Duration> {
        self.auto_reload_interval_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    // Hand-edited files may carry zeros or blanks.
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.default_limit == 0 {
            tracing::warn!("Ignoring zero default_limit in settings");
            self.default_limit = defaults.default_limit;
        }
        self.page_size_options.retain(|size| *size > 0);
        if self.page_size_options.is_empty() {
            self.page_size_options = defaults.page_size_options;
        }
        if self.query_param.trim().is_empty() {
            self.query_param = defaults.query_param;
        }
        self
    }
}
