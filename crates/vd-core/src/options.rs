//! Configuration-option specifications for action descriptors

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The type tag of a configuration option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    Text,
    Integer,
    Float,
    Bool,
    Select,
    /// Select one controller/device by unique id
    SelectDevice,
    /// Select a device + measurement pair
    SelectMeasurement,
}

/// Specification of one configurable option on an action descriptor.
///
/// The web layer renders these; the engine only reads the resolved values
/// back out of [`ActionConfig::options`](crate::ActionConfig).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSpec {
    /// Option id, the key under which the resolved value is stored
    pub id: String,
    pub kind: OptionKind,
    pub default_value: Value,
    /// For `Select`/`SelectDevice`: the permitted choices
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options_select: Vec<String>,
    /// Display label
    pub name: String,
    /// One-line help text
    pub phrase: String,
}

impl OptionSpec {
    /// A device-selection option, the most common kind among builtins
    pub fn select_device(
        id: impl Into<String>,
        name: impl Into<String>,
        phrase: impl Into<String>,
        choices: &[&str],
    ) -> Self {
        Self {
            id: id.into(),
            kind: OptionKind::SelectDevice,
            default_value: Value::String(String::new()),
            options_select: choices.iter().map(|s| s.to_string()).collect(),
            name: name.into(),
            phrase: phrase.into(),
        }
    }

    /// A float option with a default
    pub fn float(
        id: impl Into<String>,
        name: impl Into<String>,
        phrase: impl Into<String>,
        default: f64,
    ) -> Self {
        Self {
            id: id.into(),
            kind: OptionKind::Float,
            default_value: Value::from(default),
            options_select: Vec::new(),
            name: name.into(),
            phrase: phrase.into(),
        }
    }

    /// A free-text option
    pub fn text(
        id: impl Into<String>,
        name: impl Into<String>,
        phrase: impl Into<String>,
        default: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: OptionKind::Text,
            default_value: Value::String(default.into()),
            options_select: Vec::new(),
            name: name.into(),
            phrase: phrase.into(),
        }
    }

    /// A fixed-choice select option
    pub fn select(
        id: impl Into<String>,
        name: impl Into<String>,
        phrase: impl Into<String>,
        choices: &[&str],
        default: &str,
    ) -> Self {
        Self {
            id: id.into(),
            kind: OptionKind::Select,
            default_value: Value::String(default.to_string()),
            options_select: choices.iter().map(|s| s.to_string()).collect(),
            name: name.into(),
            phrase: phrase.into(),
        }
    }
}
