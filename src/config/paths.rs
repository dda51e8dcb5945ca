//! Path management for statement-recon
//!
//! ## Path Resolution Order
//!
//! 1. `RECON_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/statement-recon` or `~/.config/statement-recon`
//! 3. Windows: `%APPDATA%\statement-recon`

use std::path::PathBuf;

use crate::error::ReconError;

/// Manages all paths used by statement-recon
#[derive(Debug, Clone)]
pub struct ReconPaths {
    /// Base directory for all data
    base_dir: PathBuf,
}

impl ReconPaths {
    /// Create a new ReconPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home or application data directory can be determined.
    pub fn new() -> Result<Self, ReconError> {
        let base_dir = if let Ok(custom) = std::env::var("RECON_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create ReconPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the directory holding imported statements
    pub fn statements_dir(&self) -> PathBuf {
        self.data_dir().join("statements")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the default rules file
    pub fn rules_file(&self) -> PathBuf {
        self.base_dir.join("rules.json")
    }

    /// Get the path to the history log
    pub fn history_log(&self) -> PathBuf {
        self.base_dir.join("history.log")
    }

    /// Ensure the base, data and statements directories exist
    pub fn ensure_directories(&self) -> Result<(), ReconError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| ReconError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.statements_dir()).map_err(|e| {
            ReconError::Io(format!("Failed to create statements directory: {}", e))
        })?;

        Ok(())
    }
}

/// Resolve the default data directory path based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, ReconError> {
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => {
            let home = std::env::var("HOME")
                .map_err(|_| ReconError::Config("HOME environment variable not set".into()))?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("statement-recon"))
}

/// Resolve the default data directory path based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, ReconError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| ReconError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("statement-recon"))
}
