//! Engine settings domain model.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default estimate of merchant minutes saved per executed action.
pub const DEFAULT_MINUTES_PER_ACTION: u32 = 5;

/// Settings for the action engine, loaded from `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Fixed multiplier used by impact accounting. An estimate, not telemetry.
    #[serde(default = "default_minutes_per_action")]
    pub minutes_per_action: u32,
    /// Directory for the durable action log. `None` uses the platform data dir.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Tracing filter directive (e.g. `info`, `customfly=debug`)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_minutes_per_action() -> u32 {
    DEFAULT_MINUTES_PER_ACTION
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            minutes_per_action: default_minutes_per_action(),
            data_dir: None,
            log_level: default_log_level(),
        }
    }
}
