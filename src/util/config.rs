//! Configuration file support for propcheck.
//!
//! propcheck reads two configuration files:
//! - Global: `~/.propcheck/config.toml` - User-wide defaults
//! - Project: `.propcheck/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::deferred::DEFAULT_MAX_NESTING_DEPTH;
use crate::core::unit::ValidationSettings;

/// propcheck configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Validation settings
    pub validation: ValidationConfig,
}

/// Validation-related configuration.
///
/// Fields are optional so that a project file only overrides what it sets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Validate properties in parallel
    pub parallel: Option<bool>,

    /// Maximum number of nested deferred layers per value
    pub max_nesting_depth: Option<usize>,

    /// Fail the pass when only warnings were reported
    pub fail_on_warnings: Option<bool>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.validation.parallel.is_some() {
            self.validation.parallel = other.validation.parallel;
        }
        if other.validation.max_nesting_depth.is_some() {
            self.validation.max_nesting_depth = other.validation.max_nesting_depth;
        }
        if other.validation.fail_on_warnings.is_some() {
            self.validation.fail_on_warnings = other.validation.fail_on_warnings;
        }
    }

    /// Effective nesting limit.
    pub fn max_nesting_depth(&self) -> usize {
        self.validation
            .max_nesting_depth
            .unwrap_or(DEFAULT_MAX_NESTING_DEPTH)
    }

    /// Settings for a validation pass.
    pub fn validation_settings(&self) -> ValidationSettings {
        ValidationSettings {
            parallel: self.validation.parallel.unwrap_or(false),
            fail_on_warnings: self.validation.fail_on_warnings.unwrap_or(false),
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.propcheck/config.toml)
/// 2. Global config (~/.propcheck/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global propcheck config directory (~/.propcheck).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".propcheck"))
}

/// Get the project config path (.propcheck/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".propcheck").join("config.toml")
}
