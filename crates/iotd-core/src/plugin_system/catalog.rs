use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::traits::DataGetter;

/// Builds a fresh, uninitialized getter
pub type GetterFactory = Arc<dyn Fn() -> Box<dyn DataGetter> + Send + Sync>;

/// Table of getter type names to factories, filled once at process start
#[derive(Clone, Default)]
pub struct GetterCatalog {
    factories: HashMap<String, GetterFactory>,
}

impl GetterCatalog {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a factory under `type_name`; a name can only be taken once
    pub fn register<F>(&mut self, type_name: impl Into<String>, factory: F) -> Result<(), PluginSystemError>
    where
        F: Fn() -> Box<dyn DataGetter> + Send + Sync + 'static,
    {
        let type_name = type_name.into();
        if type_name.trim().is_empty() {
            return Err(PluginSystemError::Catalog("getter type name must not be empty".to_string()));
        }
        if self.factories.contains_key(&type_name) {
            return Err(PluginSystemError::Catalog(format!(
                "getter type '{}' is already registered",
                type_name
            )));
        }
        debug!("Registered getter type '{}'", type_name);
        self.factories.insert(type_name, Arc::new(factory));
        Ok(())
    }

    /// Create a new getter of the given type
    pub fn create(&self, type_name: &str) -> Option<Box<dyn DataGetter>> {
        self.factories.get(type_name).map(|factory| factory())
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Registered type names, sorted
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for GetterCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetterCatalog")
            .field("type_names", &self.type_names())
            .finish()
    }
}
