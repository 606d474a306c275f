//! Execution of a single action plugin by name

use crate::action::{ActionError, ActionOutput, ActionResult, ActionVars};
use crate::descriptor::{ActionDeps, ActionSet};
use crate::registry::ActionRegistry;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use vd_core::ActionConfig;

/// Loads and invokes one action plugin per call.
///
/// Every execution rebuilds the registry from the plugin sets and
/// instantiates a fresh plugin bound to the action's configuration, so
/// custom plugins registered while the process runs are picked up
/// immediately. A failed lookup or instantiation is returned as an error,
/// never propagated as a panic; the chain runner turns it into a message
/// suffix and moves on.
pub struct ActionExecutor {
    sets: Vec<Arc<ActionSet>>,
    deps: ActionDeps,
}

impl ActionExecutor {
    pub fn new(sets: Vec<Arc<ActionSet>>, deps: ActionDeps) -> Self {
        Self { sets, deps }
    }

    /// A registry snapshot over the executor's plugin sets
    pub fn registry(&self) -> ActionRegistry {
        let refs: Vec<&ActionSet> = self.sets.iter().map(Arc::as_ref).collect();
        ActionRegistry::discover(&refs, false)
    }

    /// Execute the named plugin against one action configuration.
    ///
    /// `message` is the running chain message; `vars` carries the
    /// caller-supplied override, if any.
    #[instrument(skip(self, config, message, vars), fields(action = %config.unique_id.short()))]
    pub async fn execute(
        &self,
        name: &str,
        config: &ActionConfig,
        message: &str,
        vars: &ActionVars,
    ) -> ActionResult<ActionOutput> {
        let registry = self.registry();

        let plugin = registry
            .get(name)
            .ok_or_else(|| ActionError::UnknownAction(name.to_string()))?;

        let action = (plugin.factory)(config, &self.deps)?;

        if !action.is_setup() {
            // Not enforced here: refusing to run an incomplete action is
            // the caller's call.
            warn!(name, "Executing action whose setup is incomplete");
        }

        debug!(name, "Running action");
        action.run(message, vars).await
    }

    /// Display name for a plugin, used in the chain trailer
    pub fn display_name(&self, name: &str) -> Option<&'static str> {
        self.registry().get(name).map(|p| p.descriptor.name)
    }
}
