//! Force input measurements, fire-and-forget

use crate::action::{Action, ActionOutput, ActionResult, ActionVars};
use crate::descriptor::{ActionDeps, ActionDescriptor, ActionPlugin};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, warn};
use vd_control::DeviceControl;
use vd_core::{ActionConfig, OptionSpec, UniqueId};
use vd_store::Store;

fn descriptor() -> ActionDescriptor {
    ActionDescriptor {
        name_unique: "input_force_measurements",
        name: "Input: Force Measurements",
        message: "Force an input to acquire measurements now",
        usage: "Asks the selected input controller to acquire measurements \
                immediately instead of waiting for its next period. Supply \
                {\"input_id\": \"<id>\"} as the value to override the configured \
                input. The acquisition runs independently of the chain.",
        dependencies: &[],
        custom_options: vec![OptionSpec::select_device(
            "controller",
            "Input",
            "Select the input to force measurements of",
            &["Input"],
        )],
    }
}

pub fn force_measurements_plugin() -> ActionPlugin {
    ActionPlugin::new(descriptor(), |config, deps| {
        Ok(Box::new(ForceMeasurementsAction::bind(config, deps)))
    })
}

struct ForceMeasurementsAction {
    input_id: Option<UniqueId>,
    store: Arc<dyn Store>,
    control: Arc<dyn DeviceControl>,
}

impl ForceMeasurementsAction {
    fn bind(config: &ActionConfig, deps: &ActionDeps) -> Self {
        Self {
            input_id: config
                .option_str("controller")
                .and_then(|s| UniqueId::parse(s).ok()),
            store: deps.store.clone(),
            control: deps.control.clone(),
        }
    }
}

#[async_trait]
impl Action for ForceMeasurementsAction {
    fn is_setup(&self) -> bool {
        self.input_id.is_some()
    }

    async fn run(&self, message: &str, vars: &ActionVars) -> ActionResult<ActionOutput> {
        let input_id = match vars.get_id("input_id").or_else(|| self.input_id.clone()) {
            Some(id) => id,
            None => {
                return Ok(ActionOutput::message(format!(
                    "{} Error: no input selected.",
                    message
                )))
            }
        };

        let input = match self.store.input(&input_id).await? {
            Some(input) => input,
            None => {
                error!(input = %input_id, "Input not found");
                return Ok(ActionOutput::message(format!(
                    "{} Input not found.",
                    message
                )));
            }
        };

        if !input.is_activated {
            return Ok(ActionOutput::message(format!(
                "{} Input {} is not active, cannot force measurements.",
                message,
                input_id.short()
            )));
        }

        let control = self.control.clone();
        let spawn_id = input_id.clone();
        tokio::spawn(async move {
            if let Err(e) = control.force_input_measurements(&spawn_id).await {
                warn!(input = %spawn_id, error = %e, "Force measurements failed");
            }
        });

        Ok(ActionOutput::message(format!(
            "{} Force measurements of input {} ({}, {}).",
            message,
            input_id,
            input_id.short(),
            input.name
        )))
    }
}
