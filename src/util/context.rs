//! Global context for propcheck operations.
//!
//! Provides centralized access to configuration, paths, and environment.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::core::manifest::MANIFEST_NAME;
use crate::util::config::{self, Config};

/// Errors locating a unit manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("could not find `{}` in `{}` or any parent directory", MANIFEST_NAME, .dir.display())]
    NotFound { dir: PathBuf },
}

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global propcheck data (~/.propcheck/)
    home: PathBuf,

    /// Whether to use verbose output
    verbose: bool,

    /// Whether to use colors in output
    color: bool,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::at(cwd))
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        Self::at(cwd)
    }

    fn at(cwd: PathBuf) -> Self {
        let home = config::global_config_dir().unwrap_or_else(|| PathBuf::from(".propcheck"));
        GlobalContext {
            cwd,
            home,
            verbose: false,
            color: true,
        }
    }

    /// Set verbose mode.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Set color output.
    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the propcheck home directory (~/.propcheck/).
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn color(&self) -> bool {
        self.color
    }

    /// Find `Unit.toml` starting from cwd and searching upward.
    pub fn find_manifest(&self) -> Result<PathBuf, ManifestError> {
        let mut current = self.cwd.clone();
        loop {
            let candidate = current.join(MANIFEST_NAME);
            if candidate.is_file() {
                return Ok(candidate);
            }
            if !current.pop() {
                return Err(ManifestError::NotFound {
                    dir: self.cwd.clone(),
                });
            }
        }
    }

    /// Load global config merged with the config of the project at `project_root`.
    pub fn load_config(&self, project_root: &Path) -> Config {
        config::load_config(&self.config_path(), &config::project_config_path(project_root))
    }
}
