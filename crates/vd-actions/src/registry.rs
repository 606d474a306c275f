//! Discovery of pluggable actions into a validated name index

use crate::descriptor::{ActionDescriptor, ActionPlugin, ActionSet};
use std::collections::HashMap;
use tracing::{debug, error, instrument};

/// Plugin names that are never indexed: placeholders used as templates
/// for writing new actions.
const RESERVED_NAMES: &[&str] = &["base_action", "example_action", "scratch_action"];

/// Index of action plugins keyed by unique name.
///
/// Built fresh on demand by [`discover`](ActionRegistry::discover); no
/// caching happens here, which is what makes runtime-registered custom
/// plugins usable without a restart.
pub struct ActionRegistry {
    plugins: HashMap<String, ActionPlugin>,
}

impl ActionRegistry {
    /// Scan the given plugin sets in order and build the index.
    ///
    /// The first set is the builtin set; later sets are custom. With
    /// `exclude_custom` only the first set is scanned. Reserved names are
    /// skipped. A name collision is logged as an error and the later
    /// entry is discarded; discovery itself never fails.
    #[instrument(skip(sets))]
    pub fn discover(sets: &[&ActionSet], exclude_custom: bool) -> Self {
        let mut plugins: HashMap<String, ActionPlugin> = HashMap::new();

        for (index, set) in sets.iter().enumerate() {
            if exclude_custom && index > 0 {
                break;
            }

            for plugin in set.snapshot() {
                let name = plugin.name_unique();

                if RESERVED_NAMES.contains(&name) {
                    continue;
                }

                if plugins.contains_key(name) {
                    error!(
                        set = set.name(),
                        name, "Cannot add action module: name is not unique"
                    );
                    continue;
                }

                plugins.insert(name.to_string(), plugin);
            }
        }

        debug!(count = plugins.len(), "Discovered action plugins");
        Self { plugins }
    }

    /// Look a plugin up by unique name
    pub fn get(&self, name: &str) -> Option<&ActionPlugin> {
        self.plugins.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// All indexed descriptors, for the configuration UI
    pub fn descriptors(&self) -> Vec<&ActionDescriptor> {
        self.plugins.values().map(|p| &p.descriptor).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Action, ActionOutput, ActionResult, ActionVars};
    use crate::descriptor::ActionDescriptor;
    use async_trait::async_trait;

    struct Noop;

    #[async_trait]
    impl Action for Noop {
        fn is_setup(&self) -> bool {
            true
        }

        async fn run(&self, message: &str, _vars: &ActionVars) -> ActionResult<ActionOutput> {
            Ok(ActionOutput::message(message))
        }
    }

    fn plugin(name: &'static str, display: &'static str) -> ActionPlugin {
        ActionPlugin::new(
            ActionDescriptor {
                name_unique: name,
                name: display,
                message: "",
                usage: "",
                dependencies: &[],
                custom_options: vec![],
            },
            |_, _| Ok(Box::new(Noop)),
        )
    }

    #[test]
    fn test_discover_builtin_and_custom() {
        let builtin = ActionSet::with_plugins("builtin", vec![plugin("pause", "Pause")]);
        let custom = ActionSet::with_plugins("custom", vec![plugin("my_action", "Mine")]);

        let registry = ActionRegistry::discover(&[&builtin, &custom], false);
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("pause"));
        assert!(registry.contains("my_action"));
    }

    #[test]
    fn test_exclude_custom() {
        let builtin = ActionSet::with_plugins("builtin", vec![plugin("pause", "Pause")]);
        let custom = ActionSet::with_plugins("custom", vec![plugin("my_action", "Mine")]);

        let registry = ActionRegistry::discover(&[&builtin, &custom], true);
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains("my_action"));
    }

    #[test]
    fn test_collision_keeps_first_seen() {
        let builtin = ActionSet::with_plugins("builtin", vec![plugin("pause", "Builtin pause")]);
        let custom = ActionSet::with_plugins("custom", vec![plugin("pause", "Custom pause")]);

        let registry = ActionRegistry::discover(&[&builtin, &custom], false);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("pause").unwrap().descriptor.name, "Builtin pause");
    }

    #[test]
    fn test_reserved_names_skipped() {
        let builtin = ActionSet::with_plugins(
            "builtin",
            vec![plugin("base_action", "Base"), plugin("pause", "Pause")],
        );

        let registry = ActionRegistry::discover(&[&builtin], false);
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains("base_action"));
    }

    #[test]
    fn test_late_registration_visible_next_discovery() {
        let builtin = ActionSet::with_plugins("builtin", vec![plugin("pause", "Pause")]);
        let custom = ActionSet::new("custom");

        let before = ActionRegistry::discover(&[&builtin, &custom], false);
        assert!(!before.contains("dropped_in"));

        custom.register(plugin("dropped_in", "Dropped in"));

        let after = ActionRegistry::discover(&[&builtin, &custom], false);
        assert!(after.contains("dropped_in"));
    }
}
