//! Pause: block the chain for a configured number of seconds
//!
//! This is the one builtin whose effect is deliberately synchronous; the
//! point of a pause is that the next action in the chain waits.

use crate::action::{Action, ActionOutput, ActionResult, ActionVars};
use crate::descriptor::{ActionDescriptor, ActionPlugin};
use async_trait::async_trait;
use std::time::Duration;
use vd_core::{ActionConfig, OptionSpec};

fn descriptor() -> ActionDescriptor {
    ActionDescriptor {
        name_unique: "pause",
        name: "Pause",
        message: "Pause the action chain for a duration",
        usage: "Pauses before executing the next action in the chain. \
                Supply {\"duration\": 2.5} as the value to override the configured duration.",
        dependencies: &[],
        custom_options: vec![OptionSpec::float(
            "duration",
            "Duration (seconds)",
            "How long to pause the chain",
            5.0,
        )],
    }
}

pub fn plugin() -> ActionPlugin {
    ActionPlugin::new(descriptor(), |config, _deps| {
        Ok(Box::new(PauseAction::bind(config)))
    })
}

struct PauseAction {
    duration_sec: f64,
}

impl PauseAction {
    fn bind(config: &ActionConfig) -> Self {
        Self {
            duration_sec: config.option_f64("duration").unwrap_or(5.0),
        }
    }
}

#[async_trait]
impl Action for PauseAction {
    fn is_setup(&self) -> bool {
        self.duration_sec >= 0.0
    }

    async fn run(&self, message: &str, vars: &ActionVars) -> ActionResult<ActionOutput> {
        let duration_sec = vars.get_f64("duration").unwrap_or(self.duration_sec);

        tokio::time::sleep(Duration::from_secs_f64(duration_sec.max(0.0))).await;

        Ok(ActionOutput::message(format!(
            "{} Pause ({} seconds).",
            message, duration_sec
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(duration: f64) -> ActionConfig {
        let mut options = serde_json::Map::new();
        options.insert("duration".into(), json!(duration));
        ActionConfig {
            unique_id: vd_core::UniqueId::new(),
            function_id: vd_core::UniqueId::new(),
            action_type: "pause".into(),
            options,
            position: 0,
        }
    }

    #[tokio::test]
    async fn test_pause_appends_suffix() {
        let action = PauseAction::bind(&config(0.0));
        let output = action.run("Start.", &ActionVars::none()).await.unwrap();
        assert_eq!(output.message, "Start. Pause (0 seconds).");
    }

    #[tokio::test]
    async fn test_pause_duration_override() {
        let action = PauseAction::bind(&config(30.0));
        let vars = ActionVars::with_value(json!({ "duration": 0.0 }));
        let output = action.run("", &vars).await.unwrap();
        assert!(output.message.contains("(0 seconds)"));
    }
}
