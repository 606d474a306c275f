//! Controller kinds and polymorphic controller references

use crate::records::{
    ConditionalRecord, DisplayRecord, FunctionRecord, InputRecord, MathRecord, PidRecord,
    TriggerRecord,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of controller a unique id refers to.
///
/// The order of the variants is the resolver's fixed priority order: if an
/// id somehow exists under more than one kind, the earlier kind wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerKind {
    Conditional,
    Function,
    Input,
    Display,
    Math,
    Pid,
    Trigger,
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControllerKind::Conditional => "Conditional",
            ControllerKind::Function => "Function",
            ControllerKind::Input => "Input",
            ControllerKind::Display => "Display",
            ControllerKind::Math => "Math",
            ControllerKind::Pid => "PID",
            ControllerKind::Trigger => "Trigger",
        };
        f.write_str(name)
    }
}

/// A resolved controller: the kind plus the backing record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ControllerReference {
    Conditional(ConditionalRecord),
    Function(FunctionRecord),
    Input(InputRecord),
    Display(DisplayRecord),
    Math(MathRecord),
    Pid(PidRecord),
    Trigger(TriggerRecord),
}

impl ControllerReference {
    /// The kind of the resolved controller
    pub fn kind(&self) -> ControllerKind {
        match self {
            ControllerReference::Conditional(_) => ControllerKind::Conditional,
            ControllerReference::Function(_) => ControllerKind::Function,
            ControllerReference::Input(_) => ControllerKind::Input,
            ControllerReference::Display(_) => ControllerKind::Display,
            ControllerReference::Math(_) => ControllerKind::Math,
            ControllerReference::Pid(_) => ControllerKind::Pid,
            ControllerReference::Trigger(_) => ControllerKind::Trigger,
        }
    }

    /// The display name of the backing record
    pub fn name(&self) -> &str {
        match self {
            ControllerReference::Conditional(r) => &r.name,
            ControllerReference::Function(r) => &r.name,
            ControllerReference::Input(r) => &r.name,
            ControllerReference::Display(r) => &r.name,
            ControllerReference::Math(r) => &r.name,
            ControllerReference::Pid(r) => &r.name,
            ControllerReference::Trigger(r) => &r.name,
        }
    }
}
