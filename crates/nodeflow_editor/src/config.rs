// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor configuration.
//!
//! Stored as RON, e.g. `nodeflow.ron`:
//!
//! ```ron
//! EditorConfig(
//!     version: 1,
//!     canvas: CanvasConfig(mode: edit, direction: horizontal),
//!     history_limit: 50,
//!     modules: ["Home", "Other"],
//!     initial_module: "Home",
//! )
//! ```

use crate::canvas::{EditorMode, GridConfig, Theme, ZoomLimits};
use crate::history::DEFAULT_HISTORY_LIMIT;
use nodeflow_graph::{LayoutDirection, Position};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Current configuration format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "nodeflow.ron";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("Failed to access config file {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid RON for this schema
    #[error("Failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Serialization failed
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),

    /// The file was written by a newer editor
    #[error("Config version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Newest version understood
        supported: u32,
    },

    /// A value is out of range or inconsistent
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Canvas defaults applied when the store is created
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Initial editor mode
    pub mode: EditorMode,
    /// Layout direction
    pub direction: LayoutDirection,
    /// Grid settings
    pub grid: GridConfig,
    /// Zoom bounds and step
    pub zoom: ZoomLimits,
}

/// Complete editor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Config format version
    pub version: u32,
    /// Canvas defaults
    pub canvas: CanvasConfig,
    /// Maximum undo depth per module
    pub history_limit: usize,
    /// Modules created at startup, in tab order
    pub modules: Vec<String>,
    /// Module that is current at startup
    pub initial_module: String,
    /// Offset applied to pasted and cloned nodes
    pub paste_offset: Position,
    /// Initial theme
    pub theme: Theme,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION,
            canvas: CanvasConfig::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            modules: vec!["Home".to_string(), "Other".to_string()],
            initial_module: "Home".to_string(),
            paste_offset: Position::new(20.0, 20.0),
            theme: Theme::default(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a RON document
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = ron::from_str(content)?;

        if config.version > CONFIG_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: config.version,
                supported: CONFIG_FORMAT_VERSION,
            });
        }

        config.validate()?;
        Ok(config)
    }

    /// Render as pretty RON
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron_str(&content)?;
        tracing::info!("Loaded editor config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_ron_string()?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Saved editor config to {}", path.display());
        Ok(())
    }

    /// Check value ranges and module names
    pub fn validate(&self) -> Result<(), ConfigError> {
        let zoom = &self.canvas.zoom;
        if !(zoom.min > 0.0 && zoom.min <= zoom.max) {
            return Err(ConfigError::Invalid(format!(
                "zoom range {}..{} must satisfy 0 < min <= max",
                zoom.min, zoom.max
            )));
        }
        if !(zoom.step > 0.0) {
            return Err(ConfigError::Invalid(format!("zoom step {} must be positive", zoom.step)));
        }
        if self.history_limit == 0 {
            return Err(ConfigError::Invalid("history_limit must be at least 1".to_string()));
        }
        if self.modules.is_empty() {
            return Err(ConfigError::Invalid("at least one module is required".to_string()));
        }

        let mut seen = HashSet::new();
        for name in &self.modules {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid("module names must not be empty".to_string()));
            }
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate module name \"{name}\"")));
            }
        }
        if !seen.contains(self.initial_module.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "initial module \"{}\" is not listed in modules",
                self.initial_module
            )));
        }

        Ok(())
    }
}
