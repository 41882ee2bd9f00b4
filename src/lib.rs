//! Keeps a configuration registry in sync with JSON files on disk.
//!
//! Each file is flattened into dotted-path properties and pushed into the
//! configuration named by its filename; deleting the file deletes the
//! configuration.

pub mod config;
pub mod identity;
pub mod observability;
pub mod registry;
pub mod sync;
pub mod value;

pub use config::SyncConfig;
pub use identity::{canonical_origin, parse_identity, ConfigIdentity};
pub use registry::{ConfigurationRegistry, MemoryRegistry, RegistryBinding, RegistryEvent};
pub use sync::{ConfigSync, SyncError, SyncOutcome, ORIGIN_KEY};
pub use value::{flatten, ConfigValue, FlatDict, Scalar};
