//! `lotplan.toml` settings
//!
//! ```toml
//! title = "Week 13"
//!
//! [normalize]
//! day_first = true
//! duration_policy = "abort"
//!
//! [normalize.columns]
//! mode = "fuzzy"
//!
//! [layout]
//! range = "calendar_week"
//! tick_hours = 12
//! ```
//!
//! Every key is optional. Command-line flags are applied on top.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lotplan_normalize::{ColumnPolicy, DurationPolicy, NormalizeOptions};
use lotplan_render::{LayoutOptions, RangePolicy};
use serde::{Deserialize, Serialize};

/// Looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "lotplan.toml";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Chart and dashboard title
    pub title: Option<String>,
    pub normalize: NormalizeOptions,
    pub layout: LayoutOptions,
}

/// Flags that override the file
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub fuzzy: bool,
    pub day_first: bool,
    pub abort_on_bad_duration: bool,
    pub week: bool,
    pub tick_hours: Option<u32>,
    pub no_color: bool,
    pub title: Option<String>,
}

impl Settings {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).context("invalid settings")
    }

    /// Read `explicit`, or `lotplan.toml` under `dir` when present, or
    /// fall back to defaults
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        let path: PathBuf = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = dir.join(DEFAULT_CONFIG_FILE);
                if !candidate.is_file() {
                    tracing::debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                candidate
            }
        };

        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let settings = Self::from_toml_str(&source)
            .with_context(|| format!("in config {}", path.display()))?;
        tracing::info!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn apply(&mut self, overrides: &Overrides) {
        // keep custom needles from the file when it already asks for fuzzy
        if overrides.fuzzy && !matches!(self.normalize.columns, ColumnPolicy::Fuzzy(_)) {
            self.normalize.columns = ColumnPolicy::fuzzy();
        }
        if overrides.day_first {
            self.normalize.day_first = true;
        }
        if overrides.abort_on_bad_duration {
            self.normalize.duration_policy = DurationPolicy::Abort;
        }
        if overrides.week {
            self.layout.range = RangePolicy::CalendarWeek;
        }
        if let Some(hours) = overrides.tick_hours {
            self.layout.tick_hours = hours;
        }
        if overrides.no_color {
            self.layout.color_by_product = false;
        }
        if let Some(title) = &overrides.title {
            self.title = Some(title.clone());
        }
    }

    /// Configured title, else the input file stem
    pub fn title_for(&self, input: &Path) -> String {
        self.title.clone().unwrap_or_else(|| {
            input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Production plan")
                .to_string()
        })
    }
}
