//! Engine settings.
//!
//! Settings are an explicit value handed to every entry point. Hosts build
//! one from their own configuration at call time, or load one from a TOML
//! file:
//!
//! ```toml
//! tab_size = 4
//! max_lookback = 1000
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{IndentError, Result};

/// Default number of previous lines inspected before giving up.
pub const DEFAULT_MAX_LOOKBACK: usize = 1000;

/// Default tab width in columns.
pub const DEFAULT_TAB_SIZE: usize = 4;

/// Tab width and lookback bound used by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Width of one indentation level, and of a tab character, in columns.
    pub tab_size: usize,
    /// Maximum number of previous lines inspected by a backward scan.
    #[serde(alias = "max_line_lookup_count")]
    pub max_lookback: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tab_size: DEFAULT_TAB_SIZE,
            max_lookback: DEFAULT_MAX_LOOKBACK,
        }
    }
}

impl Settings {
    /// Settings with the given tab width and the default lookback bound.
    pub fn with_tab_size(tab_size: usize) -> Self {
        Self {
            tab_size,
            ..Self::default()
        }
    }

    /// Parse settings from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content)
            .map_err(|e| IndentError::Config(format!("Failed to parse settings: {}", e)))?;
        settings.validate()
    }

    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&content).map_err(|e| match e {
            IndentError::Config(msg) => {
                IndentError::Config(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })?;
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    fn validate(self) -> Result<Self> {
        if self.tab_size == 0 {
            return Err(IndentError::Config("tab_size must be at least 1".to_string()));
        }
        Ok(self)
    }
}
