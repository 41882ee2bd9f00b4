//! Install, update and uninstall of JSON configuration files.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::identity::{canonical_origin, parse_identity, ConfigIdentity, MalformedFilename};
use crate::observability::metrics;
use crate::registry::{
    Configuration, ConfigurationId, ConfigurationRegistry, RegistryBinding, RegistryError,
};
use crate::sync::types::{SyncError, SyncOutcome, SyncResult};
use crate::value::{flatten, ConfigValue, FlatDict, Scalar};

/// Reserved property carrying the canonical origin of the source file.
pub const ORIGIN_KEY: &str = "json_config_sync.origin";

/// Keeps registry configurations in sync with configuration files.
#[derive(Clone)]
pub struct ConfigSync {
    binding: Arc<RegistryBinding>,
    extension: String,
}

impl ConfigSync {
    /// Create a sync handling `.json` files against `binding`.
    pub fn new(binding: Arc<RegistryBinding>) -> Self {
        Self {
            binding,
            extension: "json".to_string(),
        }
    }

    /// Handle files with `extension` (no leading dot) instead of `json`.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Binding this sync resolves the registry through.
    pub fn binding(&self) -> &Arc<RegistryBinding> {
        &self.binding
    }

    /// Whether `path` is a file this sync is responsible for.
    pub fn can_handle(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == self.extension)
    }

    /// Push a newly appeared file into the registry.
    pub fn install(&self, path: &Path) -> SyncResult<SyncOutcome> {
        self.install_or_update(path, "install")
    }

    /// Push a changed file into the registry.
    pub fn update(&self, path: &Path) -> SyncResult<SyncOutcome> {
        self.install_or_update(path, "update")
    }

    /// Delete the configuration bound to a removed file.
    pub fn uninstall(&self, path: &Path) -> SyncResult<ConfigurationId> {
        let result = self.uninstall_inner(path);
        match &result {
            Ok(id) => {
                tracing::info!(file = %path.display(), pid = %id, "Configuration deleted");
                metrics::record_operation("uninstall", "deleted");
            }
            Err(e) => record_failure("uninstall", path, e),
        }
        result
    }

    fn install_or_update(&self, path: &Path, operation: &'static str) -> SyncResult<SyncOutcome> {
        let result = self.sync_file(path);
        match &result {
            Ok(outcome) if outcome.changed => {
                tracing::info!(
                    file = %path.display(),
                    pid = %outcome.id,
                    created = outcome.created,
                    "Configuration updated"
                );
                metrics::record_operation(operation, if outcome.created { "created" } else { "updated" });
            }
            Ok(outcome) => {
                tracing::debug!(file = %path.display(), pid = %outcome.id, "Configuration unchanged");
                metrics::record_operation(operation, "unchanged");
            }
            Err(e) => record_failure(operation, path, e),
        }
        result
    }

    fn sync_file(&self, path: &Path) -> SyncResult<SyncOutcome> {
        let properties = read_properties(path)?;
        let identity = file_identity(path)?;
        let origin = origin_of(path)?;

        self.binding
            .with_registry(|registry| apply(registry, &identity, origin, properties))
            .ok_or(SyncError::RegistryUnavailable)?
    }

    fn uninstall_inner(&self, path: &Path) -> SyncResult<ConfigurationId> {
        let origin = origin_of(path)?;

        self.binding
            .with_registry(|registry| {
                let config = find_bound(registry, &origin)?
                    .ok_or_else(|| SyncError::NotFound { origin: origin.clone() })?;
                match registry.delete(&config.id) {
                    Ok(()) => Ok(config.id),
                    Err(RegistryError::NotFound(_)) => Err(SyncError::NotFound { origin }),
                    Err(e) => Err(e.into()),
                }
            })
            .ok_or(SyncError::RegistryUnavailable)?
    }
}

/// Read, decode and flatten a configuration file.
fn read_properties(path: &Path) -> SyncResult<FlatDict> {
    let text = fs::read_to_string(path).map_err(|source| SyncError::Io {
        file: path.to_path_buf(),
        source,
    })?;
    let parsed: serde_json::Value = serde_json::from_str(&text).map_err(|source| SyncError::Parse {
        file: path.to_path_buf(),
        source,
    })?;

    let document = ConfigValue::from(parsed);
    if !document.is_mapping() {
        return Err(SyncError::InvalidValue {
            file: path.to_path_buf(),
            key: String::new(),
            value: format!("{} {} (top level must be a mapping)", document.kind(), document),
        });
    }

    let properties = flatten(&document).map_err(|e| SyncError::InvalidValue {
        file: path.to_path_buf(),
        key: e.key,
        value: e.value,
    })?;

    if let Some(value) = properties.get(ORIGIN_KEY) {
        return Err(SyncError::InvalidValue {
            file: path.to_path_buf(),
            key: ORIGIN_KEY.to_string(),
            value: format!("{} (key is reserved)", value),
        });
    }
    Ok(properties)
}

fn file_identity(path: &Path) -> SyncResult<ConfigIdentity> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| MalformedFilename(path.display().to_string()))?;
    Ok(parse_identity(filename)?)
}

fn origin_of(path: &Path) -> SyncResult<String> {
    canonical_origin(path).map_err(|source| SyncError::Io {
        file: path.to_path_buf(),
        source,
    })
}

/// Configuration whose origin marker equals `origin`, if any.
fn find_bound(registry: &dyn ConfigurationRegistry, origin: &str) -> SyncResult<Option<Configuration>> {
    let mut found = registry.find(&|props: &FlatDict| {
        props.get(ORIGIN_KEY).and_then(Scalar::as_str) == Some(origin)
    })?;
    if found.len() > 1 {
        tracing::warn!(
            origin = %origin,
            count = found.len(),
            "Multiple configurations bound to one file, using the first"
        );
    }
    Ok(if found.is_empty() { None } else { Some(found.swap_remove(0)) })
}

fn apply(
    registry: &dyn ConfigurationRegistry,
    identity: &ConfigIdentity,
    origin: String,
    mut properties: FlatDict,
) -> SyncResult<SyncOutcome> {
    let config = match find_bound(registry, &origin)? {
        Some(existing) => existing,
        None if identity.is_factory() => registry.create_factory_instance(&identity.primary_id)?,
        None => registry.get_or_create(&identity.primary_id)?,
    };

    properties.insert(ORIGIN_KEY.to_string(), Scalar::String(origin));

    let created = config.properties().is_none();
    let changed = config.properties() != Some(&properties);
    if changed {
        registry.update(&config, properties)?;
    }

    Ok(SyncOutcome {
        id: config.id,
        incarnation: config.incarnation,
        created,
        changed,
    })
}

fn record_failure(operation: &'static str, path: &Path, error: &SyncError) {
    if error.is_transient() {
        tracing::warn!(file = %path.display(), operation, "Registry unavailable, will retry on next change");
        metrics::record_operation(operation, "unavailable");
    } else {
        tracing::error!(file = %path.display(), operation, error = %error, "Configuration sync failed");
        metrics::record_operation(operation, "failed");
    }
}
