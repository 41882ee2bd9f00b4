//! Sync results and error definitions.

use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

use crate::identity::MalformedFilename;
use crate::registry::{ConfigurationId, RegistryError};

/// Errors that abort the sync of a single file.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The file could not be read.
    #[error("failed to read {file:?}: {source}")]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON.
    #[error("failed to parse {file:?}: {source}")]
    Parse {
        file: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A leaf (or the top level) cannot be stored as a property.
    #[error("{file:?}: invalid value at key `{key}`: {value}")]
    InvalidValue {
        file: PathBuf,
        key: String,
        value: String,
    },

    /// The filename does not follow `<id>[-<instance>].<ext>`.
    #[error(transparent)]
    MalformedFilename(#[from] MalformedFilename),

    /// No registry is bound right now. Retry on a later trigger.
    #[error("configuration registry unavailable")]
    RegistryUnavailable,

    /// No configuration is bound to this file.
    #[error("no configuration bound to {origin}")]
    NotFound { origin: String },

    /// The registry backend failed.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}

impl SyncError {
    /// Whether retrying the same call later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, SyncError::RegistryUnavailable)
    }
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// What an install or update did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Configuration the file is bound to.
    pub id: ConfigurationId,
    /// Underlying instance of that configuration.
    pub incarnation: Uuid,
    /// Whether the configuration was stored for the first time.
    pub created: bool,
    /// Whether a registry write happened.
    pub changed: bool,
}
