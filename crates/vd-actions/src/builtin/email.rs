//! Email: accumulate a notification recipient
//!
//! The action itself sends nothing. It adds its recipient to the chain's
//! accumulator; the chain runner performs one gated send for the whole
//! chain after the last action has run.

use crate::action::{Action, ActionError, ActionOutput, ActionResult, ActionVars};
use crate::descriptor::{ActionDescriptor, ActionPlugin};
use async_trait::async_trait;
use vd_core::{ActionConfig, OptionSpec};

fn descriptor() -> ActionDescriptor {
    ActionDescriptor {
        name_unique: "email",
        name: "Email Notification",
        message: "Send an email notification with the chain message",
        usage: "Adds the configured address to the chain's recipient list. One email \
                is sent to all accumulated recipients after the full chain has run. \
                Supply {\"email_address\": \"someone@example.com\"} as the value to \
                override the configured address.",
        dependencies: &[],
        custom_options: vec![OptionSpec::text(
            "email_address",
            "Email Address",
            "Recipient of the notification",
            "",
        )],
    }
}

pub fn plugin() -> ActionPlugin {
    ActionPlugin::new(descriptor(), |config, _deps| {
        Ok(Box::new(EmailAction::bind(config)))
    })
}

struct EmailAction {
    recipient: String,
}

impl EmailAction {
    fn bind(config: &ActionConfig) -> Self {
        Self {
            recipient: config.option_str("email_address").unwrap_or("").to_string(),
        }
    }
}

#[async_trait]
impl Action for EmailAction {
    fn is_setup(&self) -> bool {
        !self.recipient.is_empty()
    }

    async fn run(&self, message: &str, vars: &ActionVars) -> ActionResult<ActionOutput> {
        let recipient = vars
            .get_str("email_address")
            .map(str::to_string)
            .unwrap_or_else(|| self.recipient.clone());

        if recipient.is_empty() {
            return Err(ActionError::MissingOption("email_address".into()));
        }

        Ok(
            ActionOutput::message(format!("{} Notify {}.", message, recipient))
                .with_recipient(recipient),
        )
    }
}
