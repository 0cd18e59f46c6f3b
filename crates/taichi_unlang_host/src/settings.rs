// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host settings.
//!
//! Stored as RON next to the graphs they drive. Relative paths inside the
//! file resolve against the file's own directory.

use crate::error::HostError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Default settings file name
pub const SETTINGS_FILE_NAME: &str = "unlang.ron";

/// Settings for one host run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSettings {
    /// Format version
    pub version: u32,
    /// Graph document to run
    pub graph: PathBuf,
    /// Number of ticks after `begin`
    pub ticks: u32,
    /// Seconds per tick
    pub fixed_delta: f32,
    /// `tracing` filter directives, e.g. `"info,taichi_unlang=debug"`
    pub log_filter: String,
    /// Where to write the graph snapshot after the run
    pub export_path: Option<PathBuf>,
    /// Fail a wave that crosses the same link twice
    pub cycle_guard: bool,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            graph: PathBuf::from("graph.ron"),
            ticks: 0,
            fixed_delta: 1.0 / 60.0,
            log_filter: "info".to_string(),
            export_path: None,
            cycle_guard: false,
        }
    }
}

impl HostSettings {
    /// Create settings for a graph file
    pub fn for_graph(graph: impl Into<PathBuf>) -> Self {
        Self {
            graph: graph.into(),
            ..Self::default()
        }
    }

    /// Load settings from a file, resolving relative paths against it
    pub fn load(path: &Path) -> Result<Self, HostError> {
        let content = std::fs::read_to_string(path).map_err(|e| HostError::io(path, e))?;
        let mut settings: HostSettings = ron::from_str(&content)?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(HostError::UnsupportedSettings {
                found: settings.version,
                supported: SETTINGS_FORMAT_VERSION,
            });
        }

        if let Some(dir) = path.parent() {
            settings.graph = dir.join(&settings.graph);
            settings.export_path = settings.export_path.map(|p| dir.join(p));
        }

        tracing::debug!(path = %path.display(), "loaded host settings");
        Ok(settings)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), HostError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        let content = ron::ser::to_string_pretty(self, config)?;
        std::fs::write(path, content).map_err(|e| HostError::io(path, e))
    }
}
