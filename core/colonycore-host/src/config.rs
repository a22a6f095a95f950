//! Host configuration read from `colonycore.toml`.

use colonycore_store::StoreConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColonyConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub export: WorkerConfig,
    #[serde(default)]
    pub host: HostConfig,
}

impl ColonyConfig {
    /// Loads configuration from `path`, falling back to defaults when the
    /// file is missing or malformed.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config file found at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => {
                    info!("Loaded configuration from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Failed to parse config file {:?}: {}. Using defaults.", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

/// Export worker settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerConfig {
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Used when an export request names no formats.
    #[serde(default = "default_formats")]
    pub default_formats: Vec<String>,
}

fn default_queue_capacity() -> usize {
    32
}

fn default_formats() -> Vec<String> {
    vec!["json".to_string(), "csv".to_string()]
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            default_formats: default_formats(),
        }
    }
}

/// Plugin host settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Entity model major version plugins and templates must match.
    #[serde(default = "default_entity_model_major")]
    pub entity_model_major: u32,
}

fn default_entity_model_major() -> u32 {
    1
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            entity_model_major: default_entity_model_major(),
        }
    }
}
