//! Factory registry
//!
//! Maps component type names to constructors. Hosts ask for a semicolon
//! separated list of class names, then create components by name. The
//! registry is an ordinary value; [`FactoryRegistry::global`] exposes a
//! process-wide instance that an explicit startup step populates.

use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;

use crate::component::Component;
use crate::error::RegistryError;

/// Component constructor
pub type Constructor = Arc<dyn Fn() -> Component + Send + Sync>;

/// Registered constructors, in registration order
#[derive(Default)]
pub struct FactoryRegistry {
    entries: Mutex<Vec<(String, Constructor)>>,
}

static GLOBAL_REGISTRY: LazyLock<FactoryRegistry> = LazyLock::new(FactoryRegistry::new);

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry, created on first use
    pub fn global() -> &'static FactoryRegistry {
        &GLOBAL_REGISTRY
    }

    /// Register a constructor. Each name may be registered once.
    pub fn register<F>(&self, name: impl Into<String>, constructor: F) -> Result<(), RegistryError>
    where
        F: Fn() -> Component + Send + Sync + 'static,
    {
        let name = name.into();
        let mut entries = self.entries.lock();
        if entries.iter().any(|(existing, _)| *existing == name) {
            return Err(RegistryError::AlreadyRegistered(name));
        }
        tracing::debug!(component = %name, "component registered");
        entries.push((name, Arc::new(constructor)));
        Ok(())
    }

    /// Construct a fresh component, or `None` for an unknown name.
    ///
    /// The constructor runs after the registry lock is released, so it may
    /// itself use the registry.
    pub fn create(&self, name: &str) -> Option<Component> {
        let constructor = self
            .entries
            .lock()
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, constructor)| Arc::clone(constructor))?;
        tracing::debug!(component = name, "component created");
        Some(constructor())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.lock().iter().any(|(existing, _)| existing == name)
    }

    /// All registered names joined with `;`
    pub fn class_names(&self) -> String {
        self.entries
            .lock()
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join(";")
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl std::fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("class_names", &self.class_names())
            .finish()
    }
}
