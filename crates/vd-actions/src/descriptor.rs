//! Action descriptors, factories, and plugin sets

use crate::action::{Action, ActionResult};
use std::sync::{Arc, RwLock};
use vd_control::DeviceControl;
use vd_core::{ActionConfig, OptionSpec};
use vd_store::{SampleStore, Store};

/// Discovered plugin metadata. Built once per plugin, read-only after
/// construction, keyed by `name_unique`.
#[derive(Debug, Clone)]
pub struct ActionDescriptor {
    /// Immutable unique key
    pub name_unique: &'static str,
    /// Human display name
    pub name: &'static str,
    /// One-line purpose message
    pub message: &'static str,
    /// Usage template shown in the configuration UI
    pub usage: &'static str,
    /// External dependencies the plugin needs, if any
    pub dependencies: &'static [&'static str],
    /// Ordered configuration-option specifications
    pub custom_options: Vec<OptionSpec>,
}

/// Collaborators handed to every action factory
#[derive(Clone)]
pub struct ActionDeps {
    pub store: Arc<dyn Store>,
    pub samples: Arc<dyn SampleStore>,
    pub control: Arc<dyn DeviceControl>,
}

/// Factory binding a plugin to one action configuration.
///
/// Called fresh for every execution, so a plugin registered after the
/// process started is picked up without a restart.
pub type ActionFactory =
    Arc<dyn Fn(&ActionConfig, &ActionDeps) -> ActionResult<Box<dyn Action>> + Send + Sync>;

/// One pluggable action: descriptor plus factory
#[derive(Clone)]
pub struct ActionPlugin {
    pub descriptor: ActionDescriptor,
    pub factory: ActionFactory,
}

impl ActionPlugin {
    pub fn new<F>(descriptor: ActionDescriptor, factory: F) -> Self
    where
        F: Fn(&ActionConfig, &ActionDeps) -> ActionResult<Box<dyn Action>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            descriptor,
            factory: Arc::new(factory),
        }
    }

    pub fn name_unique(&self) -> &'static str {
        self.descriptor.name_unique
    }
}

/// An ordered collection of plugins, the unit the registry scans.
///
/// Two sets exist in a standard deployment: the builtin set and the
/// custom set. Registering into the custom set at runtime makes the
/// plugin visible to the next discovery pass.
pub struct ActionSet {
    name: &'static str,
    plugins: RwLock<Vec<ActionPlugin>>,
}

impl ActionSet {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            plugins: RwLock::new(Vec::new()),
        }
    }

    pub fn with_plugins(name: &'static str, plugins: Vec<ActionPlugin>) -> Self {
        Self {
            name,
            plugins: RwLock::new(plugins),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Add a plugin; visible from the next discovery pass on
    pub fn register(&self, plugin: ActionPlugin) {
        self.plugins
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(plugin);
    }

    /// Snapshot of the set's plugins in registration order
    pub fn snapshot(&self) -> Vec<ActionPlugin> {
        self.plugins
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
