//! Activate / deactivate a controller, fire-and-forget

use crate::action::{Action, ActionOutput, ActionResult, ActionVars};
use crate::descriptor::{ActionDeps, ActionDescriptor, ActionPlugin};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;
use vd_control::DeviceControl;
use vd_core::{ActionConfig, OptionSpec, UniqueId};

fn activate_descriptor() -> ActionDescriptor {
    ActionDescriptor {
        name_unique: "activate_controller",
        name: "Controller: Activate",
        message: "Activate a controller",
        usage: "Activates the selected controller. Supply \
                {\"controller_id\": \"<id>\"} as the value to override the \
                configured controller.",
        dependencies: &[],
        custom_options: vec![OptionSpec::select_device(
            "controller",
            "Controller",
            "Select the controller to activate",
            &["Conditional", "Function", "Input", "Pid", "Trigger"],
        )],
    }
}

fn deactivate_descriptor() -> ActionDescriptor {
    ActionDescriptor {
        name_unique: "deactivate_controller",
        name: "Controller: Deactivate",
        message: "Deactivate a controller",
        usage: "Deactivates the selected controller. Supply \
                {\"controller_id\": \"<id>\"} as the value to override the \
                configured controller.",
        dependencies: &[],
        custom_options: vec![OptionSpec::select_device(
            "controller",
            "Controller",
            "Select the controller to deactivate",
            &["Conditional", "Function", "Input", "Pid", "Trigger"],
        )],
    }
}

pub fn activate_plugin() -> ActionPlugin {
    ActionPlugin::new(activate_descriptor(), |config, deps| {
        Ok(Box::new(ControllerAction::bind(config, deps, true)))
    })
}

pub fn deactivate_plugin() -> ActionPlugin {
    ActionPlugin::new(deactivate_descriptor(), |config, deps| {
        Ok(Box::new(ControllerAction::bind(config, deps, false)))
    })
}

struct ControllerAction {
    controller_id: Option<UniqueId>,
    activate: bool,
    control: Arc<dyn DeviceControl>,
}

impl ControllerAction {
    fn bind(config: &ActionConfig, deps: &ActionDeps, activate: bool) -> Self {
        Self {
            controller_id: config
                .option_str("controller")
                .and_then(|s| UniqueId::parse(s).ok()),
            activate,
            control: deps.control.clone(),
        }
    }
}

#[async_trait]
impl Action for ControllerAction {
    fn is_setup(&self) -> bool {
        self.controller_id.is_some()
    }

    async fn run(&self, message: &str, vars: &ActionVars) -> ActionResult<ActionOutput> {
        let controller_id = match vars
            .get_id("controller_id")
            .or_else(|| self.controller_id.clone())
        {
            Some(id) => id,
            None => {
                return Ok(ActionOutput::message(format!(
                    "{} Error: no controller selected.",
                    message
                )))
            }
        };

        let verb = if self.activate { "Activate" } else { "Deactivate" };
        let suffix = format!(" {} controller {}.", verb, controller_id.short());

        let control = self.control.clone();
        let activate = self.activate;
        tokio::spawn(async move {
            let result = if activate {
                control.activate_controller(&controller_id).await
            } else {
                control.deactivate_controller(&controller_id).await
            };
            if let Err(e) = result {
                warn!(controller = %controller_id, error = %e, "Controller command failed");
            }
        });

        Ok(ActionOutput::message(format!("{}{}", message, suffix)))
    }
}
