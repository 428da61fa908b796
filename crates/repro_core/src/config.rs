//! Harness configuration.

use crate::error::{HarnessError, HarnessResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Harness configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Directory holding the backend's bundled library files
    pub lib_dir: PathBuf,
    /// Version key used when none is requested
    pub default_version: String,
    /// File name for repro content before any `@filename` directive
    pub default_file_name: String,
    /// Rendered diagnostics printed before truncating
    pub max_rendered_diagnostics: usize,
}

impl HarnessConfig {
    /// Create a configuration with the given library directory
    #[must_use]
    pub fn new(lib_dir: impl Into<PathBuf>) -> Self {
        Self {
            lib_dir: lib_dir.into(),
            ..Self::default()
        }
    }

    /// Set the default version key
    #[must_use]
    pub fn with_default_version(mut self, version: impl Into<String>) -> Self {
        self.default_version = version.into();
        self
    }

    /// Set the default file name
    #[must_use]
    pub fn with_default_file_name(mut self, name: impl Into<String>) -> Self {
        self.default_file_name = name.into();
        self
    }

    /// Set the truncation limit
    #[must_use]
    pub fn with_max_rendered_diagnostics(mut self, max: usize) -> Self {
        self.max_rendered_diagnostics = max;
        self
    }

    /// Load from a JSON file; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> HarnessResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| HarnessError::Input {
            reason: format!("{}: {}", path.display(), e),
        })?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            lib_dir: PathBuf::from("lib"),
            default_version: "latest".to_string(),
            default_file_name: "repro.ts".to_string(),
            max_rendered_diagnostics: 10,
        }
    }
}
