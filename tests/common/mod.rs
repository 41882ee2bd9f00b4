//! Shared utilities for integration tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use json_config_sync::registry::{
    Configuration, ConfigurationId, ConfigurationRegistry, Properties, RegistryResult,
};
use json_config_sync::{ConfigSync, MemoryRegistry, RegistryBinding};

/// A temporary configuration directory with a bound in-memory registry.
pub struct Workspace {
    pub dir: tempfile::TempDir,
    pub registry: Arc<MemoryRegistry>,
    pub sync: ConfigSync,
}

impl Workspace {
    pub fn new() -> Self {
        Self::with_registry(MemoryRegistry::new(None))
    }

    pub fn with_registry(registry: MemoryRegistry) -> Self {
        let registry = Arc::new(registry);
        let binding = Arc::new(RegistryBinding::bound(registry.clone()));
        Self {
            dir: tempfile::tempdir().unwrap(),
            registry,
            sync: ConfigSync::new(binding),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write `content` to `name` and return its path.
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[allow(dead_code)]
    pub fn remove(&self, path: &Path) {
        fs::remove_file(path).unwrap();
    }
}

/// Registry that counts the writes reaching its backing store.
#[allow(dead_code)]
#[derive(Default)]
pub struct CountingRegistry {
    pub inner: MemoryRegistry,
    updates: AtomicUsize,
    deletes: AtomicUsize,
}

#[allow(dead_code)]
impl CountingRegistry {
    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

impl ConfigurationRegistry for CountingRegistry {
    fn get_or_create(&self, pid: &str) -> RegistryResult<Configuration> {
        self.inner.get_or_create(pid)
    }

    fn create_factory_instance(&self, factory_pid: &str) -> RegistryResult<Configuration> {
        self.inner.create_factory_instance(factory_pid)
    }

    fn find(&self, filter: &dyn Fn(&Properties) -> bool) -> RegistryResult<Vec<Configuration>> {
        self.inner.find(filter)
    }

    fn update(&self, config: &Configuration, properties: Properties) -> RegistryResult<()> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.inner.update(config, properties)
    }

    fn delete(&self, id: &ConfigurationId) -> RegistryResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(id)
    }
}
