//! In-process registry with optional file persistence.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;

use crate::registry::{
    Configuration, ConfigurationId, ConfigurationRegistry, Properties, RegistryError,
    RegistryResult,
};

/// A thread-safe configuration store.
///
/// With a persistence path, the full state is rewritten after every
/// update or delete.
#[derive(Clone, Default)]
pub struct MemoryRegistry {
    inner: Arc<DashMap<String, Configuration>>,
    persistence_path: Option<PathBuf>,
    save_lock: Arc<Mutex<()>>,
}

impl MemoryRegistry {
    /// Create an empty registry.
    pub fn new(persistence_path: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            persistence_path,
            save_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Load from file if it exists; the file becomes the persistence path.
    pub fn load_from_file(path: &Path) -> RegistryResult<Self> {
        let registry = Self::new(Some(path.to_path_buf()));
        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let stored: Vec<Configuration> = serde_json::from_reader(reader)?;
            for config in stored {
                registry.inner.insert(config.id.pid.clone(), config);
            }
            tracing::debug!(path = %path.display(), count = registry.inner.len(), "Loaded registry state");
        }
        Ok(registry)
    }

    /// Write the full state to the persistence path, if any.
    pub fn save_to_file(&self) -> RegistryResult<()> {
        let _guard = self.save_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.write_state(self.inner.iter().map(|r| r.value().clone()).collect())
    }

    /// Persist the state that results from replacing (or, with `None`,
    /// removing) `pid`. The map is left untouched; callers apply the change
    /// only once this succeeds.
    fn persist_change(&self, pid: &str, replacement: Option<&Configuration>) -> RegistryResult<()> {
        if self.persistence_path.is_none() {
            return Ok(());
        }
        let stored = self
            .inner
            .iter()
            .filter(|r| r.key() != pid)
            .map(|r| r.value().clone())
            .chain(replacement.cloned())
            .collect();
        self.write_state(stored)
    }

    fn write_state(&self, mut stored: Vec<Configuration>) -> RegistryResult<()> {
        let Some(path) = &self.persistence_path else {
            return Ok(());
        };
        stored.sort_by(|a, b| a.id.pid.cmp(&b.id.pid));

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        // Write-then-rename so readers never see a half-written state file.
        let staging = staging_path(path);
        {
            let mut writer = BufWriter::new(File::create(&staging)?);
            serde_json::to_writer_pretty(&mut writer, &stored)?;
            writer.flush()?;
        }
        fs::rename(&staging, path)?;
        tracing::debug!(path = %path.display(), count = stored.len(), "Saved registry state");
        Ok(())
    }

    /// Number of stored configurations.
    pub fn count(&self) -> usize {
        self.inner.len()
    }

    /// Stored configuration for `pid`, without creating one.
    pub fn get(&self, pid: &str) -> Option<Configuration> {
        self.inner.get(pid).map(|r| r.value().clone())
    }

    /// All stored configurations, sorted by pid.
    pub fn list(&self) -> Vec<Configuration> {
        let mut all: Vec<Configuration> = self.inner.iter().map(|r| r.value().clone()).collect();
        all.sort_by(|a, b| a.id.pid.cmp(&b.id.pid));
        all
    }
}

impl ConfigurationRegistry for MemoryRegistry {
    fn get_or_create(&self, pid: &str) -> RegistryResult<Configuration> {
        Ok(self
            .get(pid)
            .unwrap_or_else(|| Configuration::new(ConfigurationId::singleton(pid))))
    }

    fn create_factory_instance(&self, factory_pid: &str) -> RegistryResult<Configuration> {
        Ok(Configuration::new(ConfigurationId::factory_instance(factory_pid)))
    }

    fn find(&self, filter: &dyn Fn(&Properties) -> bool) -> RegistryResult<Vec<Configuration>> {
        let mut found: Vec<Configuration> = self
            .inner
            .iter()
            .filter(|r| r.value().properties().is_some_and(|p| filter(p)))
            .map(|r| r.value().clone())
            .collect();
        found.sort_by(|a, b| a.id.pid.cmp(&b.id.pid));
        Ok(found)
    }

    fn update(&self, config: &Configuration, properties: Properties) -> RegistryResult<()> {
        let stored = config.clone().with_properties(properties);
        let _guard = self.save_lock.lock().unwrap_or_else(PoisonError::into_inner);

        self.persist_change(&stored.id.pid, Some(&stored))?;
        self.inner.insert(stored.id.pid.clone(), stored);
        Ok(())
    }

    fn delete(&self, id: &ConfigurationId) -> RegistryResult<()> {
        let _guard = self.save_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.inner.contains_key(&id.pid) {
            return Err(RegistryError::NotFound(id.pid.clone()));
        }

        self.persist_change(&id.pid, None)?;
        self.inner.remove(&id.pid);
        Ok(())
    }
}

/// `<state file>.tmp`, next to the state file.
fn staging_path(path: &Path) -> PathBuf {
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    PathBuf::from(staging)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Scalar;

    fn props(pairs: &[(&str, &str)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Scalar::from(*v)))
            .collect()
    }

    #[test]
    fn test_unsaved_configuration_is_invisible() {
        let registry = MemoryRegistry::new(None);
        let config = registry.get_or_create("foo").unwrap();

        assert!(config.properties().is_none());
        assert_eq!(registry.count(), 0);
        assert!(registry.find(&|_: &Properties| true).unwrap().is_empty());
    }

    #[test]
    fn test_update_then_get_returns_same_instance() {
        let registry = MemoryRegistry::new(None);
        let config = registry.get_or_create("foo").unwrap();
        registry.update(&config, props(&[("a", "1")])).unwrap();

        let again = registry.get_or_create("foo").unwrap();
        assert_eq!(again.incarnation, config.incarnation);
        assert_eq!(again.properties(), Some(&props(&[("a", "1")])));
    }

    #[test]
    fn test_update_replaces_whole_property_set() {
        let registry = MemoryRegistry::new(None);
        let config = registry.get_or_create("foo").unwrap();
        registry.update(&config, props(&[("a", "1"), ("b", "2")])).unwrap();
        registry.update(&config, props(&[("c", "3")])).unwrap();

        let stored = registry.get("foo").unwrap();
        assert_eq!(stored.properties(), Some(&props(&[("c", "3")])));
    }

    #[test]
    fn test_find_by_property() {
        let registry = MemoryRegistry::new(None);
        for (pid, origin) in [("a", "file:///a.json"), ("b", "file:///b.json")] {
            let config = registry.get_or_create(pid).unwrap();
            registry.update(&config, props(&[("origin", origin)])).unwrap();
        }

        let found = registry
            .find(&|p: &Properties| p.get("origin").and_then(Scalar::as_str) == Some("file:///b.json"))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id.pid, "b");
    }

    #[test]
    fn test_delete_unknown_is_not_found() {
        let registry = MemoryRegistry::new(None);
        let err = registry.delete(&ConfigurationId::singleton("nope")).unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(pid) if pid == "nope"));
    }

    #[test]
    fn test_recreated_configuration_is_new_incarnation() {
        let registry = MemoryRegistry::new(None);
        let first = registry.get_or_create("foo").unwrap();
        registry.update(&first, props(&[("a", "1")])).unwrap();
        registry.delete(&first.id).unwrap();

        let second = registry.get_or_create("foo").unwrap();
        assert_ne!(second.incarnation, first.incarnation);
        assert!(second.properties().is_none());
    }

    #[test]
    fn test_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("registry.json");

        let registry = MemoryRegistry::new(Some(path.clone()));
        let config = registry.create_factory_instance("web").unwrap();
        registry.update(&config, props(&[("port", "8080")])).unwrap();

        let loaded = MemoryRegistry::load_from_file(&path).unwrap();
        let stored = loaded.get(&config.id.pid).unwrap();
        assert_eq!(stored.id.factory_pid.as_deref(), Some("web"));
        assert_eq!(stored.incarnation, config.incarnation);
        assert_eq!(stored.properties(), Some(&props(&[("port", "8080")])));
    }

    #[test]
    fn test_failed_save_leaves_update_unapplied() {
        let dir = tempfile::tempdir().unwrap();
        // The state file's parent is a regular file, so saving always fails.
        let blocker = dir.path().join("state");
        fs::write(&blocker, "").unwrap();
        let registry = MemoryRegistry::new(Some(blocker.join("registry.json")));

        let config = registry.get_or_create("foo").unwrap();
        let err = registry.update(&config, props(&[("a", "1")])).unwrap_err();
        assert!(matches!(err, RegistryError::Persistence(_)));
        assert_eq!(registry.count(), 0);
        assert!(registry.get_or_create("foo").unwrap().properties().is_none());
    }

    #[test]
    fn test_failed_save_keeps_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let state_dir = dir.path().join("state");
        let registry = MemoryRegistry::new(Some(state_dir.join("registry.json")));

        let config = registry.get_or_create("foo").unwrap();
        registry.update(&config, props(&[("a", "1")])).unwrap();

        fs::remove_dir_all(&state_dir).unwrap();
        fs::write(&state_dir, "").unwrap();

        assert!(registry.update(&config, props(&[("a", "2")])).is_err());
        assert_eq!(registry.get("foo").unwrap().properties(), Some(&props(&[("a", "1")])));

        assert!(registry.delete(&config.id).is_err());
        assert!(registry.get("foo").is_some());

        // Once the path is writable again the retry goes through.
        fs::remove_file(&state_dir).unwrap();
        registry.delete(&config.id).unwrap();
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_staging_file_never_aliases_state_file() {
        let path = Path::new("/var/lib/sync/state.tmp");
        assert_eq!(staging_path(path), Path::new("/var/lib/sync/state.tmp.tmp"));
        assert_eq!(
            staging_path(Path::new("registry.json")),
            Path::new("registry.json.tmp")
        );
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = MemoryRegistry::load_from_file(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded.count(), 0);
    }
}
