//! Core types for Verdant
//!
//! This crate provides the fundamental types used throughout the Verdant
//! controller: UniqueId, controller kinds, entity records, condition
//! descriptors, and configuration-option specifications.

mod condition;
mod controller;
mod id;
mod options;
mod records;

pub use condition::{ConditionKind, ConditionRecord, MeasurementRef, OutputRef};
pub use controller::{ControllerKind, ControllerReference};
pub use id::{UniqueId, UniqueIdError};
pub use options::{OptionKind, OptionSpec};
pub use records::{
    ActionConfig, Attachment, CameraRecord, ConditionalRecord, DisplayRecord, FunctionRecord,
    InputRecord, MathRecord, NoteRecord, NoteTagRecord, OutputChannelRecord, PidRecord,
    SmtpConfig, SmtpGateState, TriggerRecord,
};

/// Error suffix appended to the chain message when an action id has no
/// backing record. The chain continues after appending it.
pub fn action_not_found_suffix(id: &UniqueId) -> String {
    format!("Error: Action with ID {} not found!", id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_suffix_is_literal() {
        let id = UniqueId::parse("959019d1-c1fa-41fe-a554-7be3366a9c5b").unwrap();
        assert_eq!(
            action_not_found_suffix(&id),
            "Error: Action with ID 959019d1-c1fa-41fe-a554-7be3366a9c5b not found!"
        );
    }
}
