//! Closed mapping from adapter label to constructor.

use std::collections::BTreeMap;

use docpub_core::{ConfigError, RemoteConfig};

use crate::cms::{self, CmsRemote};
use crate::noop::{self, NoopRemote};
use crate::remote::Remote;

/// Builds an adapter from the remote section of the config.
pub type RemoteFactory = Box<dyn Fn(&RemoteConfig) -> Box<dyn Remote>>;

pub struct AdapterRegistry {
    factories: BTreeMap<String, RemoteFactory>,
}

impl AdapterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// A registry holding the built-in `noop` and `cms` adapters.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(noop::LABEL, |config| Box::new(NoopRemote::from_config(config)));
        registry.register(cms::LABEL, |config| Box::new(CmsRemote::from_config(config)));
        registry
    }

    /// Register (or replace) the factory for `label`.
    pub fn register<F>(&mut self, label: &str, factory: F)
    where
        F: Fn(&RemoteConfig) -> Box<dyn Remote> + 'static,
    {
        self.factories.insert(label.to_string(), Box::new(factory));
    }

    /// Registered labels, sorted.
    pub fn labels(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Fail with [`ConfigError::UnknownAdapter`] when `label` is not registered.
    pub fn check_label(&self, label: &str) -> Result<(), ConfigError> {
        if self.factories.contains_key(label) {
            Ok(())
        } else {
            Err(ConfigError::UnknownAdapter {
                label: label.to_string(),
                known: self.labels().join(", "),
            })
        }
    }

    /// Construct and validate the adapter named by `config.adapter`.
    pub fn build(&self, config: &RemoteConfig) -> Result<Box<dyn Remote>, ConfigError> {
        let factory = self
            .factories
            .get(&config.adapter)
            .ok_or_else(|| ConfigError::UnknownAdapter {
                label: config.adapter.clone(),
                known: self.labels().join(", "),
            })?;
        let remote = factory(config);
        remote.validate_config()?;
        tracing::debug!(adapter = %config.adapter, "remote adapter ready");
        Ok(remote)
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
