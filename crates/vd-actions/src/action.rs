//! The action plugin contract

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use vd_core::{Attachment, UniqueId};

/// Action errors
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("no action named '{0}' is registered")]
    UnknownAction(String),

    #[error("action plugin failed to load: {0}")]
    PluginLoad(String),

    #[error("action is not configured: missing option '{0}'")]
    MissingOption(String),

    #[error("invalid option '{option}': {reason}")]
    InvalidOption { option: String, reason: String },

    #[error(transparent)]
    Store(#[from] vd_store::StoreError),

    #[error(transparent)]
    Control(#[from] vd_control::ControlError),
}

/// Result type for action execution
pub type ActionResult<T> = Result<T, ActionError>;

/// The `vars` bag handed to every action run.
///
/// `value` is the caller-supplied override, absent for ordinary chain
/// runs. A plugin reads its override under a domain-specific key (e.g.
/// `"display_id"`) and falls back to its configured option when the key
/// is absent — the override-or-default contract every plugin honors.
#[derive(Debug, Clone, Default)]
pub struct ActionVars {
    pub value: Option<Value>,
}

impl ActionVars {
    pub fn none() -> Self {
        Self { value: None }
    }

    pub fn with_value(value: Value) -> Self {
        Self { value: Some(value) }
    }

    /// The override stored under `key`, if the caller supplied one
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.value.as_ref().and_then(|v| v.get(key))
    }

    /// String override under `key`
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Unique-id override under `key`
    pub fn get_id(&self, key: &str) -> Option<UniqueId> {
        self.get_str(key).and_then(|s| UniqueId::parse(s).ok())
    }

    /// Float override under `key`
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }
}

/// What one action run produced: the updated message plus any partial
/// chain results to merge into the run's accumulator.
#[derive(Debug, Clone, Default)]
pub struct ActionOutput {
    /// The updated chain message (input message plus a suffix describing
    /// the effect)
    pub message: String,
    /// Note tags to accumulate, append-only
    pub note_tags: Vec<UniqueId>,
    /// Email recipients to accumulate, append-only
    pub email_recipients: Vec<String>,
    /// Attachment reference; replaces any earlier attachment in the chain
    pub attachment: Option<Attachment>,
}

impl ActionOutput {
    /// An output that only updates the message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.email_recipients.push(recipient.into());
        self
    }

    pub fn with_note_tags(mut self, tags: impl IntoIterator<Item = UniqueId>) -> Self {
        self.note_tags.extend(tags);
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

/// One instantiated action plugin, bound to its configuration.
///
/// `run` returns the updated message; side effects that touch hardware
/// are dispatched fire-and-forget, so the message describes intent, not
/// completion.
#[async_trait]
pub trait Action: Send + Sync {
    /// Whether the configuration is complete enough to run.
    ///
    /// The executor surfaces this but does not enforce it; refusing to
    /// invoke an unconfigured action is the caller's decision.
    fn is_setup(&self) -> bool;

    async fn run(&self, message: &str, vars: &ActionVars) -> ActionResult<ActionOutput>;
}
