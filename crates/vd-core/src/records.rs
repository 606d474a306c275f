//! Entity record shapes exchanged with the persistence collaborator
//!
//! Verdant does not own a database; these are the shapes the `Store`
//! collaborator traffics in. Mutation of automation configuration happens
//! outside the engine, so everything here is treated as read-only once
//! handed to a chain run.

use crate::UniqueId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// One configured occurrence of an action attached to a Function.
///
/// `action_type` names the plugin descriptor; `options` holds the resolved
/// values for the descriptor's custom options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionConfig {
    pub unique_id: UniqueId,
    /// The owning Function (or Trigger/Conditional) id
    pub function_id: UniqueId,
    /// Unique name of the plugin descriptor this action is backed by
    pub action_type: String,
    /// Resolved custom option values, keyed by option id
    #[serde(default)]
    pub options: serde_json::Map<String, Value>,
    /// Position within the owning Function's ordered action list
    #[serde(default)]
    pub position: u32,
}

impl ActionConfig {
    /// Look up a configured option value
    pub fn option(&self, id: &str) -> Option<&Value> {
        self.options.get(id)
    }

    /// Look up a configured option as a string
    pub fn option_str(&self, id: &str) -> Option<&str> {
        self.option(id).and_then(Value::as_str)
    }

    /// Look up a configured option as a float
    pub fn option_f64(&self, id: &str) -> Option<f64> {
        self.option(id).and_then(Value::as_f64)
    }

    /// Look up a configured option as a bool
    pub fn option_bool(&self, id: &str) -> Option<bool> {
        self.option(id).and_then(Value::as_bool)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub unique_id: UniqueId,
    pub name: String,
    /// Device type of the custom function controller
    pub device: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalRecord {
    pub unique_id: UniqueId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    pub unique_id: UniqueId,
    pub name: String,
    pub device: String,
    pub is_activated: bool,
}

/// A physical display (LCD) controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayRecord {
    pub unique_id: UniqueId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MathRecord {
    pub unique_id: UniqueId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PidRecord {
    pub unique_id: UniqueId,
    pub name: String,
    pub is_activated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerRecord {
    pub unique_id: UniqueId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraRecord {
    pub unique_id: UniqueId,
    pub name: String,
}

/// One channel of a multi-channel output device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputChannelRecord {
    pub unique_id: UniqueId,
    pub output_id: UniqueId,
    pub channel: u32,
}

/// A label attachable to persisted notes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteTagRecord {
    pub unique_id: UniqueId,
    pub name: String,
}

/// A persisted note created at the end of a chain run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub unique_id: UniqueId,
    pub name: String,
    pub tags: Vec<UniqueId>,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

/// Outbound SMTP configuration, including the hourly send limit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub protocol: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub email_from: String,
    /// Maximum notification emails per rolling hour
    pub hourly_max: u32,
}

/// Persisted notification-gate counters.
///
/// Mutated by every gate check and shared process-wide; survives restarts
/// through the persistence collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmtpGateState {
    pub email_count: u32,
    pub window_reset_at: DateTime<Utc>,
}

/// A single email attachment produced by an action.
///
/// At most one attachment survives a chain run: a later action that
/// produces one silently replaces any earlier reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub file: PathBuf,
    /// Attachment kind tag, e.g. "still" or "video"
    pub kind: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_config_option_accessors() {
        let mut options = serde_json::Map::new();
        options.insert("controller".into(), json!("abc-123"));
        options.insert("duration".into(), json!(5.5));
        options.insert("state".into(), json!(true));

        let config = ActionConfig {
            unique_id: UniqueId::new(),
            function_id: UniqueId::new(),
            action_type: "pause".into(),
            options,
            position: 0,
        };

        assert_eq!(config.option_str("controller"), Some("abc-123"));
        assert_eq!(config.option_f64("duration"), Some(5.5));
        assert_eq!(config.option_bool("state"), Some(true));
        assert_eq!(config.option("missing"), None);
    }
}
