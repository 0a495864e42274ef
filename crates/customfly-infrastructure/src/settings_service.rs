//! Settings service implementation.
//!
//! Loads [`EngineSettings`] from `config.toml`, writing the defaults when the
//! file does not exist yet.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use customfly_core::config::EngineSettings;
use customfly_core::error::Result;

use crate::paths::CustomflyPaths;
use crate::storage::AtomicFile;

/// Loads and caches the engine settings.
#[derive(Debug, Clone)]
pub struct SettingsService {
    config_path: PathBuf,
    /// Cached settings, loaded lazily on first access
    cache: Arc<RwLock<Option<EngineSettings>>>,
}

impl SettingsService {
    /// Creates a service reading the platform config file.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(CustomflyPaths::default().config_file()?))
    }

    /// Creates a service reading a specific file (for testing).
    pub fn with_path(config_path: PathBuf) -> Self {
        Self {
            config_path,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the settings, loading from file if not cached.
    pub fn get_settings(&self) -> Result<EngineSettings> {
        {
            let cached = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(settings) = cached.as_ref() {
                return Ok(settings.clone());
            }
        }

        let loaded = self.load_or_create()?;
        tracing::debug!(
            target: "customfly::settings",
            path = %self.config_path.display(),
            "Loaded engine settings"
        );

        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        *cache = Some(loaded.clone());
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        *cache = None;
    }

    fn load_or_create(&self) -> Result<EngineSettings> {
        let file = AtomicFile::<EngineSettings>::toml(self.config_path.clone());
        match file.load()? {
            Some(settings) => Ok(settings),
            None => {
                let defaults = EngineSettings::default();
                file.save(&defaults)?;
                Ok(defaults)
            }
        }
    }
}
