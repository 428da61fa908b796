//! Version table mapping keys to installed backends.

use crate::backend::Backend;
use crate::reference::ReferenceBackend;
use crate::session::Session;
use indexmap::IndexMap;
use repro_core::{HarnessError, HarnessResult};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Creates fresh sessions for one registered version
#[derive(Clone)]
pub struct SessionFactory {
    /// Version key
    pub label: String,
    /// Backend shared by every session
    pub backend: Arc<dyn Backend>,
    /// Real directory holding this version's library files
    pub lib_dir: PathBuf,
}

impl SessionFactory {
    /// Create a factory
    #[must_use]
    pub fn new(label: impl Into<String>, backend: Arc<dyn Backend>, lib_dir: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            backend,
            lib_dir: lib_dir.into(),
        }
    }

    /// Create an empty session
    #[must_use]
    pub fn create(&self) -> Session {
        Session::new(self.label.clone(), Arc::clone(&self.backend), self.lib_dir.clone())
    }
}

impl std::fmt::Debug for SessionFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionFactory")
            .field("label", &self.label)
            .field("version", &self.backend.version())
            .field("lib_dir", &self.lib_dir)
            .finish()
    }
}

/// Registry of backend versions
///
/// Keys keep their registration order; sweeps run in that order.
#[derive(Default)]
pub struct BackendRegistry {
    /// Factories by version key
    versions: IndexMap<String, SessionFactory>,
}

impl BackendRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the reference backend as `latest`, `2.0.0`, and `1.0.0`
    #[must_use]
    pub fn with_reference_backends(lib_dir: impl Into<PathBuf>) -> Self {
        let lib_dir = lib_dir.into();
        let mut registry = Self::new();
        for (key, version) in [("latest", "3.0.0"), ("2.0.0", "2.0.0"), ("1.0.0", "1.0.0")] {
            let backend: Arc<dyn Backend> = Arc::new(ReferenceBackend::new(version));
            registry.versions.insert(
                key.to_string(),
                SessionFactory::new(key, backend, lib_dir.clone()),
            );
        }
        registry
    }

    /// Register a backend under `key`
    ///
    /// # Errors
    ///
    /// Returns error if the key is already registered
    pub fn register(
        &mut self,
        key: &str,
        backend: Arc<dyn Backend>,
        lib_dir: impl Into<PathBuf>,
    ) -> HarnessResult<()> {
        if self.versions.contains_key(key) {
            return Err(HarnessError::DuplicateVersion {
                key: key.to_string(),
            });
        }
        self.versions
            .insert(key.to_string(), SessionFactory::new(key, backend, lib_dir));
        Ok(())
    }

    /// Factory for one version
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedVersion` listing the known keys
    pub fn lookup(&self, key: &str) -> HarnessResult<&SessionFactory> {
        debug!(version = key, "looking up backend");
        self.versions
            .get(key)
            .ok_or_else(|| HarnessError::UnsupportedVersion {
                requested: key.to_string(),
                known: self.versions(),
            })
    }

    /// Create a session for one version
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedVersion` listing the known keys
    pub fn create_session(&self, key: &str) -> HarnessResult<Session> {
        self.lookup(key).map(SessionFactory::create)
    }

    /// Registered keys in order
    #[must_use]
    pub fn versions(&self) -> Vec<String> {
        self.versions.keys().cloned().collect()
    }

    /// Factories for every version in order
    #[must_use]
    pub fn session_factories(&self) -> Vec<SessionFactory> {
        self.versions.values().cloned().collect()
    }

    /// Factories starting with `first`, followed by every other version in order
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedVersion` if `first` is unknown
    pub fn sweep_from(&self, first: &str) -> HarnessResult<Vec<SessionFactory>> {
        let head = self.lookup(first)?.clone();
        let mut factories = vec![head];
        factories.extend(
            self.versions
                .iter()
                .filter(|(key, _)| key.as_str() != first)
                .map(|(_, factory)| factory.clone()),
        );
        Ok(factories)
    }

    /// Number of registered versions
    #[must_use]
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Check if no version is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::bundled_lib_dir;

    #[test]
    fn test_registry_new() {
        let registry = BackendRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_reference_versions_in_order() {
        let registry = BackendRegistry::with_reference_backends(bundled_lib_dir());
        assert_eq!(registry.versions(), vec!["latest", "2.0.0", "1.0.0"]);
        let factory = registry.lookup("latest").unwrap();
        assert_eq!(factory.backend.version(), "3.0.0");
    }

    #[test]
    fn test_unknown_version() {
        let registry = BackendRegistry::with_reference_backends(bundled_lib_dir());
        let err = registry.create_session("0.1.0").err().unwrap();
        assert_eq!(
            err.to_string(),
            "Unsupported version \"0.1.0\". Supported values: latest, 2.0.0, 1.0.0"
        );
    }

    #[test]
    fn test_register_duplicate() {
        let mut registry = BackendRegistry::new();
        registry
            .register("x", Arc::new(ReferenceBackend::new("1.0.0")), bundled_lib_dir())
            .unwrap();
        let result = registry.register("x", Arc::new(ReferenceBackend::new("2.0.0")), bundled_lib_dir());
        assert!(matches!(result, Err(HarnessError::DuplicateVersion { .. })));
    }

    #[test]
    fn test_sessions_are_independent() {
        let registry = BackendRegistry::with_reference_backends(bundled_lib_dir());
        let mut first = registry.create_session("latest").unwrap();
        let second = registry.create_session("latest").unwrap();
        first.set_option("strict", "true").unwrap();
        assert!(first.options().flag("strict"));
        assert!(!second.options().flag("strict"));
        assert_eq!(second.label(), "latest");
    }

    #[test]
    fn test_sweep_from() {
        let registry = BackendRegistry::with_reference_backends(bundled_lib_dir());
        let labels: Vec<String> = registry
            .sweep_from("2.0.0")
            .unwrap()
            .into_iter()
            .map(|f| f.label)
            .collect();
        assert_eq!(labels, vec!["2.0.0", "latest", "1.0.0"]);
        assert!(registry.sweep_from("9.9.9").is_err());
    }
}
