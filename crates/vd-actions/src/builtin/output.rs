//! Output on/off: switch one output channel, fire-and-forget

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
        name_unique: "output_on_off",
        name: "Output: On/Off",
        message: "Turn an output channel on or off",
        usage: "Switches the selected output channel. Supply \
                {\"output_channel_id\": \"<id>\"} as the value to override the \
                configured channel. The switch command is dispatched to the daemon \
                and runs independently of the chain.",
        dependencies: &[],
        custom_options: vec![
            OptionSpec::select_device(
                "output_channel",
                "Output Channel",
                "Select the output channel to switch",
                &["Output"],
            ),
            OptionSpec::select("state", "State", "On or Off", &["on", "off"], "on"),
            OptionSpec::float(
                "duration",
                "Duration (seconds)",
                "If on and nonzero, turn off again after this long",
                0.0,
            ),
        ],
    }
}

pub fn plugin() -> ActionPlugin {
    ActionPlugin::new(descriptor(), |config, deps| {
        Ok(Box::new(OutputAction::bind(config, deps)))
    })
}

struct OutputAction {
    channel_id: Option<UniqueId>,
    on: bool,
    duration_sec: f64,
    store: Arc<dyn Store>,
    control: Arc<dyn DeviceControl>,
}

impl OutputAction {
    fn bind(config: &ActionConfig, deps: &ActionDeps) -> Self {
        Self {
            channel_id: config
                .option_str("output_channel")
                .and_then(|s| UniqueId::parse(s).ok()),
            on: config.option_str("state").unwrap_or("on") == "on",
            duration_sec: config.option_f64("duration").unwrap_or(0.0),
            store: deps.store.clone(),
            control: deps.control.clone(),
        }
    }
}

#[async_trait]
impl Action for OutputAction {
    fn is_setup(&self) -> bool {
        self.channel_id.is_some()
    }

    async fn run(&self, message: &str, vars: &ActionVars) -> ActionResult<ActionOutput> {
        let channel_id = match vars
            .get_id("output_channel_id")
            .or_else(|| self.channel_id.clone())
        {
            Some(id) => id,
            None => {
                return Ok(ActionOutput::message(format!(
                    "{} Error: no output channel selected.",
                    message
                )))
            }
        };

        let channel = match self.store.output_channel(&channel_id).await? {
            Some(channel) => channel,
            None => {
                error!(channel = %channel_id, "Output channel not found");
                return Ok(ActionOutput::message(format!(
                    "{} Output channel not found.",
                    message
                )));
            }
        };

        let on = vars
            .get_str("state")
            .map(|s| s == "on")
            .unwrap_or(self.on);
        let duration = match self.duration_sec {
            d if d > 0.0 && on => Some(d),
            _ => None,
        };

        let control = self.control.clone();
        let output_id = channel.output_id.clone();
        let channel_number = channel.channel;
        tokio::spawn(async move {
            if let Err(e) = control
                .output_on_off(&output_id, channel_number, on, duration)
                .await
            {
                warn!(output = %output_id, error = %e, "Output switch command failed");
            }
        });

        Ok(ActionOutput::message(format!(
            "{} Turn output {} channel {} {}.",
            message,
            channel.output_id.short(),
            channel.channel,
            if on { "on" } else { "off" }
        )))
    }
}
