//! Publish on the outbound message protocol
//!
//! This is the reserved action kind the chain runner always skips in
//! bulk chain execution; it remains invokable through single-action
//! execution.

use crate::action::{Action, ActionError, ActionOutput, ActionResult, ActionVars};
use crate::descriptor::{ActionDeps, ActionDescriptor, ActionPlugin};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;
use vd_control::DeviceControl;
use vd_core::{ActionConfig, OptionSpec};

fn descriptor() -> ActionDescriptor {
    ActionDescriptor {
        name_unique: "publish_message",
        name: "Publish Message",
        message: "Publish a payload on the outbound message protocol",
        usage: "Publishes the configured payload (or the chain message when no \
                payload is configured) to the configured topic. Supply \
                {\"payload\": \"...\"} as the value to override the payload. \
                Skipped during bulk chain execution; run it as a single action.",
        dependencies: &[],
        custom_options: vec![
            OptionSpec::text("topic", "Topic", "Topic to publish to", ""),
            OptionSpec::text(
                "payload",
                "Payload",
                "Payload to publish; empty publishes the chain message",
                "",
            ),
        ],
    }
}

pub fn plugin() -> ActionPlugin {
    ActionPlugin::new(descriptor(), |config, deps| {
        Ok(Box::new(PublishAction::bind(config, deps)))
    })
}

struct PublishAction {
    topic: String,
    payload: String,
    control: Arc<dyn DeviceControl>,
}

impl PublishAction {
    fn bind(config: &ActionConfig, deps: &ActionDeps) -> Self {
        Self {
            topic: config.option_str("topic").unwrap_or("").to_string(),
            payload: config.option_str("payload").unwrap_or("").to_string(),
            control: deps.control.clone(),
        }
    }
}

#[async_trait]
impl Action for PublishAction {
    fn is_setup(&self) -> bool {
        !self.topic.is_empty()
    }

    async fn run(&self, message: &str, vars: &ActionVars) -> ActionResult<ActionOutput> {
        if self.topic.is_empty() {
            return Err(ActionError::MissingOption("topic".into()));
        }

        let payload = vars
            .get_str("payload")
            .map(str::to_string)
            .unwrap_or_else(|| {
                if self.payload.is_empty() {
                    message.to_string()
                } else {
                    self.payload.clone()
                }
            });

        let control = self.control.clone();
        let topic = self.topic.clone();
        let spawn_topic = topic.clone();
        tokio::spawn(async move {
            if let Err(e) = control.publish_message(&spawn_topic, &payload).await {
                warn!(topic = %spawn_topic, error = %e, "Publish failed");
            }
        });

        Ok(ActionOutput::message(format!(
            "{} Publish to {}.",
            message, topic
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vd_control::{ControlCommand, RecordingControl};
    use vd_store::MemoryStore;

    fn setup() -> (ActionDeps, Arc<RecordingControl>) {
        let store = Arc::new(MemoryStore::new());
        let control = Arc::new(RecordingControl::new());
        (
            ActionDeps {
                store: store.clone(),
                samples: store,
                control: control.clone(),
            },
            control,
        )
    }

    fn config(topic: &str, payload: &str) -> ActionConfig {
        let mut options = serde_json::Map::new();
        options.insert("topic".into(), json!(topic));
        options.insert("payload".into(), json!(payload));
        ActionConfig {
            unique_id: vd_core::UniqueId::new(),
            function_id: vd_core::UniqueId::new(),
            action_type: "publish_message".into(),
            options,
            position: 0,
        }
    }

    #[tokio::test]
    async fn test_publishes_chain_message_by_default() {
        let (deps, control) = setup();
        let action = PublishAction::bind(&config("greenhouse/alerts", ""), &deps);

        action.run("Temperature high.", &ActionVars::none()).await.unwrap();

        tokio::task::yield_now().await;
        assert_eq!(
            control.commands(),
            vec![ControlCommand::PublishMessage {
                topic: "greenhouse/alerts".into(),
                payload: "Temperature high.".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_payload_override() {
        let (deps, control) = setup();
        let action = PublishAction::bind(&config("t", "configured"), &deps);

        let vars = ActionVars::with_value(json!({ "payload": "override" }));
        action.run("msg", &vars).await.unwrap();

        tokio::task::yield_now().await;
        assert!(matches!(
            &control.commands()[0],
            ControlCommand::PublishMessage { payload, .. } if payload == "override"
        ));
    }

    #[tokio::test]
    async fn test_missing_topic_errors() {
        let (deps, _) = setup();
        let action = PublishAction::bind(&config("", ""), &deps);
        assert!(matches!(
            action.run("", &ActionVars::none()).await,
            Err(ActionError::MissingOption(_))
        ));
    }
}
