// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host error type.

use std::path::PathBuf;
use taichi_unlang::{GraphError, LangError, PersistError};

/// Error raised by the host
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// File could not be read or written
    #[error("{path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Settings file could not be parsed
    #[error("Settings parse error: {0}")]
    SettingsParse(#[from] ron::error::SpannedError),

    /// Settings could not be written
    #[error("Settings write error: {0}")]
    SettingsWrite(#[from] ron::Error),

    /// Settings were written by a newer host
    #[error("Settings version {found} is newer than supported version {supported}")]
    UnsupportedSettings {
        /// Version found in the file
        found: u32,
        /// Highest version this build reads
        supported: u32,
    },

    /// Graph failed to load or run
    #[error(transparent)]
    Lang(#[from] LangError),

    /// Logging could not be initialized
    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl HostError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<GraphError> for HostError {
    fn from(e: GraphError) -> Self {
        Self::Lang(e.into())
    }
}

impl From<PersistError> for HostError {
    fn from(e: PersistError) -> Self {
        Self::Lang(e.into())
    }
}
