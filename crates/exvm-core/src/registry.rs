//! Engine discovery.
//!
//! [`EngineRegistry`] maps engine names to [`EngineFactory`] descriptors so a
//! host can enumerate the engines it knows about and bind one by name. Only
//! factories that speak [`ABI_VERSION`] are accepted.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, info};

use exvm_common::RegistryError;

use crate::engine::{ABI_VERSION, Engine, EngineFactory};
use crate::example::example_vm_factory;

/// Thread-safe registry of engine factories.
///
/// Cloning is cheap; clones share the same underlying map.
#[derive(Clone, Default)]
pub struct EngineRegistry {
    factories: Arc<DashMap<String, EngineFactory>>,
}

impl EngineRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in engines.
    pub fn with_builtin() -> Self {
        let registry = Self::new();
        registry.insert(example_vm_factory());
        registry
    }

    /// Register a factory.
    ///
    /// # Errors
    ///
    /// Returns an error if the factory declares a different ABI version or
    /// an engine with the same name is already registered.
    pub fn register(&self, factory: EngineFactory) -> Result<(), RegistryError> {
        if !factory.is_compatible() {
            return Err(RegistryError::AbiMismatch {
                name: factory.name.to_string(),
                expected: ABI_VERSION,
                found: factory.abi_version,
            });
        }

        match self.factories.entry(factory.name.to_string()) {
            Entry::Occupied(_) => Err(RegistryError::DuplicateEngine {
                name: factory.name.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(factory);
                info!(engine = factory.name, "Engine registered");
                Ok(())
            }
        }
    }

    fn insert(&self, factory: EngineFactory) {
        self.factories.insert(factory.name.to_string(), factory);
    }

    /// Remove a factory, returning it if it was registered.
    pub fn unregister(&self, name: &str) -> Option<EngineFactory> {
        self.factories.remove(name).map(|(_, factory)| factory)
    }

    /// Look up a factory by name.
    pub fn get(&self, name: &str) -> Result<EngineFactory, RegistryError> {
        self.factories
            .get(name)
            .map(|entry| *entry.value())
            .ok_or_else(|| RegistryError::not_found(name))
    }

    /// Create an engine instance by name.
    pub fn create(&self, name: &str) -> Result<Box<dyn Engine>, RegistryError> {
        let factory = self.get(name)?;
        debug!(engine = name, "Creating engine instance");
        Ok(factory.create())
    }

    /// Names of all registered engines, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .factories
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Number of registered engines.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` if no engines are registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineRegistry")
            .field("engines", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::example::EXAMPLE_VM_NAME;

    #[test]
    fn test_builtin_registry() {
        let registry = EngineRegistry::with_builtin();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.names(), vec![EXAMPLE_VM_NAME.to_string()]);
        assert!(registry.get(EXAMPLE_VM_NAME).is_ok());
    }

    #[test]
    fn test_not_found() {
        let registry = EngineRegistry::new();
        assert!(registry.is_empty());

        let err = registry.get("evmjit").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_duplicate_rejected() {
        let registry = EngineRegistry::new();
        registry.register(example_vm_factory()).unwrap();

        let err = registry.register(example_vm_factory()).unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateEngine {
                name: EXAMPLE_VM_NAME.to_string()
            }
        );
    }

    #[test]
    fn test_abi_mismatch_rejected() {
        let registry = EngineRegistry::new();
        let factory = EngineFactory {
            abi_version: ABI_VERSION + 1,
            ..example_vm_factory()
        };

        let err = registry.register(factory).unwrap_err();
        assert!(matches!(err, RegistryError::AbiMismatch { found, .. } if found == ABI_VERSION + 1));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregister() {
        let registry = EngineRegistry::with_builtin();
        let clone = registry.clone();

        assert!(clone.unregister(EXAMPLE_VM_NAME).is_some());
        assert!(registry.is_empty());
        assert!(registry.unregister(EXAMPLE_VM_NAME).is_none());
    }
}
