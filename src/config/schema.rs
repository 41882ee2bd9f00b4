//! Settings schema definitions.
//!
//! All types derive Serde traits for deserialization from the settings file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct SyncConfig {
    /// Registry backend settings.
    pub registry: RegistryConfig,

    /// Which files are handled.
    pub watch: WatchConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Registry backend settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RegistryConfig {
    /// File the registry state is persisted to.
    pub state_file: PathBuf,

    /// Persist registry state after every write.
    pub persist: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from(".json-config-sync/registry.json"),
            persist: true,
        }
    }
}

/// File selection settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct WatchConfig {
    /// Directory scanned by `sync` when none is given.
    pub directory: PathBuf,

    /// Extension of handled files, without the dot.
    pub extension: String,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            extension: "json".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}
