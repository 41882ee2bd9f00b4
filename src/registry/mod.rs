//! Configuration registry collaborator.
//!
//! # Data Flow
//! ```text
//! registry backend (MemoryRegistry, or any ConfigurationRegistry)
//!     → RegistryEvent::Added / Removed
//!     → binding.rs (optional handle behind an RwLock)
//!     → sync operations take the read lock for their whole duration
//! ```
//!
//! # Design Decisions
//! - A configuration exists in the registry only after its first update;
//!   `get_or_create` / `create_factory_instance` hand out unsaved snapshots
//! - Every stored instance carries an incarnation id, so a configuration
//!   recreated after delete is distinguishable from the deleted one
//! - Updates replace the whole property set

pub mod binding;
pub mod memory;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::value::FlatDict;

pub use binding::{RegistryBinding, RegistryEvent};
pub use memory::MemoryRegistry;

/// Property set held by a managed configuration.
pub type Properties = FlatDict;

/// Registry-level identity of a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigurationId {
    /// Persistent id. For factory instances: `<factory_pid>.<uuid>`.
    pub pid: String,
    /// Factory this instance was created from.
    pub factory_pid: Option<String>,
}

impl ConfigurationId {
    pub fn singleton(pid: impl Into<String>) -> Self {
        Self {
            pid: pid.into(),
            factory_pid: None,
        }
    }

    /// Fresh instance id under `factory_pid`.
    pub fn factory_instance(factory_pid: impl Into<String>) -> Self {
        let factory_pid = factory_pid.into();
        Self {
            pid: format!("{}.{}", factory_pid, Uuid::new_v4()),
            factory_pid: Some(factory_pid),
        }
    }
}

impl fmt::Display for ConfigurationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pid)
    }
}

/// Snapshot of a configuration as handed out by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub id: ConfigurationId,
    /// Identifies this underlying instance; a deleted and recreated
    /// configuration with the same pid gets a new incarnation.
    pub incarnation: Uuid,
    properties: Option<Properties>,
}

impl Configuration {
    /// Unsaved configuration with no properties.
    pub fn new(id: ConfigurationId) -> Self {
        Self {
            id,
            incarnation: Uuid::new_v4(),
            properties: None,
        }
    }

    pub(crate) fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Current property set; `None` until the configuration is first written.
    pub fn properties(&self) -> Option<&Properties> {
        self.properties.as_ref()
    }
}

/// Errors raised by a registry backend.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No configuration with this pid is stored.
    #[error("configuration `{0}` not found")]
    NotFound(String),

    /// Persisting registry state failed.
    #[error("registry persistence failed: {0}")]
    Persistence(#[from] std::io::Error),

    /// Persisted registry state could not be encoded or decoded.
    #[error("registry state is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// The configuration store this crate keeps in sync with files.
pub trait ConfigurationRegistry: Send + Sync {
    /// Stored configuration for `pid`, or a new unsaved one.
    fn get_or_create(&self, pid: &str) -> RegistryResult<Configuration>;

    /// New unsaved factory instance with a fresh pid.
    fn create_factory_instance(&self, factory_pid: &str) -> RegistryResult<Configuration>;

    /// Stored configurations whose properties satisfy `filter`.
    fn find(&self, filter: &dyn Fn(&Properties) -> bool) -> RegistryResult<Vec<Configuration>>;

    /// Replace the whole property set of `config`, storing it if new.
    fn update(&self, config: &Configuration, properties: Properties) -> RegistryResult<()>;

    /// Remove a stored configuration.
    fn delete(&self, id: &ConfigurationId) -> RegistryResult<()>;
}
