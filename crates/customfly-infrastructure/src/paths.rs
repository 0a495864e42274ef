//! Path management for customfly configuration and data files.
//!
//! ```text
//! ~/.config/customfly/         # Config directory
//! └── config.toml              # Engine settings
//!
//! ~/.local/share/customfly/    # Data directory
//! └── actions.json             # Durable action log
//! ```

use std::path::PathBuf;

use customfly_core::CustomflyError;

const APP_DIR: &str = "customfly";

/// Resolves customfly paths, optionally rooted at a custom base directory
/// (tests and embedded deployments).
#[derive(Debug, Clone, Default)]
pub struct CustomflyPaths {
    base_dir: Option<PathBuf>,
}

impl CustomflyPaths {
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    /// Returns the configuration directory (e.g. `~/.config/customfly/`).
    pub fn config_dir(&self) -> Result<PathBuf, CustomflyError> {
        match &self.base_dir {
            Some(base) => Ok(base.join("config")),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or_else(|| CustomflyError::config("Cannot find config directory")),
        }
    }

    /// Returns the data directory (e.g. `~/.local/share/customfly/`).
    pub fn data_dir(&self) -> Result<PathBuf, CustomflyError> {
        match &self.base_dir {
            Some(base) => Ok(base.join("data")),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or_else(|| CustomflyError::config("Cannot find data directory")),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, CustomflyError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Path of the action log, honouring a `data_dir` override from settings.
    pub fn action_log_file(&self, data_dir: Option<&PathBuf>) -> Result<PathBuf, CustomflyError> {
        let dir = match data_dir {
            Some(dir) => dir.clone(),
            None => self.data_dir()?,
        };
        Ok(dir.join("actions.json"))
    }
}
