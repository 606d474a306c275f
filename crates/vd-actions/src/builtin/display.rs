//! Display actions: backlight color and flash off
//!
//! Both dispatch their command to the daemon fire-and-forget; the suffix
//! appended to the chain message records intent, not completion.

use crate::action::{Action, ActionOutput, ActionResult, ActionVars};
use crate::descriptor::{ActionDeps, ActionDescriptor, ActionPlugin};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, warn};
use vd_control::DeviceControl;
use vd_core::{ActionConfig, OptionSpec, UniqueId};
use vd_store::Store;

fn backlight_color_descriptor() -> ActionDescriptor {
    ActionDescriptor {
        name_unique: "display_backlight_color",
        name: "Display: Backlight Color",
        message: "Set the backlight color of a display",
        usage: "Sets the backlight color of the selected display. Supply \
                {\"display_id\": \"<id>\"} as the value to override the \
                configured display.",
        dependencies: &[],
        custom_options: vec![
            OptionSpec::select_device(
                "controller",
                "Display",
                "Select the display to change the backlight color of",
                &["Display"],
            ),
            OptionSpec::text(
                "color",
                "Color (RGB)",
                "Color as comma-separated red,green,blue values",
                "255,255,255",
            ),
        ],
    }
}

fn flash_off_descriptor() -> ActionDescriptor {
    ActionDescriptor {
        name_unique: "display_flash_off",
        name: "Display: Flashing Off",
        message: "Turn display flashing off",
        usage: "Stops the backlight flashing on the selected display. Supply \
                {\"display_id\": \"<id>\"} as the value to override the \
                configured display.",
        dependencies: &[],
        custom_options: vec![OptionSpec::select_device(
            "controller",
            "Display",
            "Select the display to stop flashing the backlight",
            &["Display"],
        )],
    }
}

pub fn backlight_color_plugin() -> ActionPlugin {
    ActionPlugin::new(backlight_color_descriptor(), |config, deps| {
        let color = config
            .option_str("color")
            .unwrap_or("255,255,255")
            .to_string();
        Ok(Box::new(DisplayAction::bind(
            config,
            deps,
            DisplayCommand::BacklightColor(color),
        )))
    })
}

pub fn flash_off_plugin() -> ActionPlugin {
    ActionPlugin::new(flash_off_descriptor(), |config, deps| {
        Ok(Box::new(DisplayAction::bind(
            config,
            deps,
            DisplayCommand::FlashOff,
        )))
    })
}

#[derive(Clone)]
enum DisplayCommand {
    BacklightColor(String),
    FlashOff,
}

struct DisplayAction {
    display_id: Option<UniqueId>,
    command: DisplayCommand,
    store: Arc<dyn Store>,
    control: Arc<dyn DeviceControl>,
}

impl DisplayAction {
    fn bind(config: &ActionConfig, deps: &ActionDeps, command: DisplayCommand) -> Self {
        Self {
            display_id: config
                .option_str("controller")
                .and_then(|s| UniqueId::parse(s).ok()),
            command,
            store: deps.store.clone(),
            control: deps.control.clone(),
        }
    }
}

#[async_trait]
impl Action for DisplayAction {
    fn is_setup(&self) -> bool {
        self.display_id.is_some()
    }

    async fn run(&self, message: &str, vars: &ActionVars) -> ActionResult<ActionOutput> {
        let display_id = match vars.get_id("display_id").or_else(|| self.display_id.clone()) {
            Some(id) => id,
            None => {
                return Ok(ActionOutput::message(format!(
                    "{} Error: no display selected.",
                    message
                )))
            }
        };

        let display = match self.store.display(&display_id).await? {
            Some(display) => display,
            None => {
                error!(display = %display_id, "Display not found");
                return Ok(ActionOutput::message(format!(
                    "{} Display not found.",
                    message
                )));
            }
        };

        let command = match &self.command {
            DisplayCommand::BacklightColor(color) => DisplayCommand::BacklightColor(
                vars.get_str("color").unwrap_or(color).to_string(),
            ),
            DisplayCommand::FlashOff => DisplayCommand::FlashOff,
        };

        let suffix = match &command {
            DisplayCommand::BacklightColor(color) => format!(
                " Display {} ({}, {}) Backlight Color to {}.",
                display_id,
                display_id.short(),
                display.name,
                color
            ),
            DisplayCommand::FlashOff => format!(
                " Display {} ({}, {}) Flash Off.",
                display_id,
                display_id.short(),
                display.name
            ),
        };

        let control = self.control.clone();
        tokio::spawn(async move {
            let result = match command {
                DisplayCommand::BacklightColor(color) => {
                    control.lcd_backlight_color(&display_id, &color).await
                }
                DisplayCommand::FlashOff => control.lcd_flash_off(&display_id).await,
            };
            if let Err(e) = result {
                warn!(display = %display_id, error = %e, "Display command failed");
            }
        });

        Ok(ActionOutput::message(format!("{}{}", message, suffix)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vd_control::{ControlCommand, RecordingControl};
    use vd_core::DisplayRecord;
    use vd_store::MemoryStore;

    fn setup(display_id: &UniqueId) -> (ActionDeps, Arc<RecordingControl>) {
        let store = Arc::new(MemoryStore::new());
        let control = Arc::new(RecordingControl::new());
        store.insert_display(DisplayRecord {
            unique_id: display_id.clone(),
            name: "Greenhouse LCD".into(),
        });
        (
            ActionDeps {
                store: store.clone(),
                samples: store,
                control: control.clone(),
            },
            control,
        )
    }

    fn config(display_id: &UniqueId) -> ActionConfig {
        let mut options = serde_json::Map::new();
        options.insert("controller".into(), json!(display_id.as_str()));
        ActionConfig {
            unique_id: UniqueId::new(),
            function_id: UniqueId::new(),
            action_type: "display_flash_off".into(),
            options,
            position: 0,
        }
    }

    #[tokio::test]
    async fn test_flash_off_dispatched() {
        let display_id = UniqueId::new();
        let (deps, control) = setup(&display_id);
        let action = DisplayAction::bind(&config(&display_id), &deps, DisplayCommand::FlashOff);

        let output = action.run("Alert.", &ActionVars::none()).await.unwrap();
        assert!(output.message.contains("Flash Off."));
        assert!(output.message.contains("Greenhouse LCD"));

        tokio::task::yield_now().await;
        assert_eq!(
            control.commands(),
            vec![ControlCommand::LcdFlashOff {
                display_id: display_id.clone()
            }]
        );
    }

    #[tokio::test]
    async fn test_backlight_color_override() {
        let display_id = UniqueId::new();
        let (deps, control) = setup(&display_id);
        let action = DisplayAction::bind(
            &config(&display_id),
            &deps,
            DisplayCommand::BacklightColor("255,255,255".into()),
        );

        let vars = ActionVars::with_value(json!({ "color": "0,255,0" }));
        let output = action.run("", &vars).await.unwrap();
        assert!(output.message.contains("Backlight Color to 0,255,0."));

        tokio::task::yield_now().await;
        assert_eq!(
            control.commands(),
            vec![ControlCommand::LcdBacklightColor {
                display_id,
                color: "0,255,0".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_display_id_override() {
        let configured = UniqueId::new();
        let overridden = UniqueId::new();
        let (deps, control) = setup(&overridden);
        let action = DisplayAction::bind(&config(&configured), &deps, DisplayCommand::FlashOff);

        let vars = ActionVars::with_value(json!({ "display_id": overridden.as_str() }));
        let output = action.run("", &vars).await.unwrap();
        assert!(output.message.contains(overridden.short()));

        tokio::task::yield_now().await;
        assert_eq!(control.commands().len(), 1);
    }
}
