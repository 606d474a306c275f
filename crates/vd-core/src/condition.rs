//! Condition descriptors consumed by the condition value resolver

use crate::UniqueId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The kind of value a condition produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    /// Most recent measurement within the max-age window
    Measurement,
    /// Average of all measurements within the max-age window
    MeasurementPastAverage,
    /// Sum of all measurements within the max-age window
    MeasurementPastSum,
    /// The full (timestamp, value) series within the max-age window
    MeasurementSeries,
    /// Raw hardware pin state, best effort
    GpioState,
    /// Whether an output channel is currently active
    OutputState,
    /// How long an output channel has currently been on, in seconds
    OutputDurationOn,
    /// Whether a controller is currently active
    ControllerStatus,
}

/// A device + measurement pair identifying one time series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementRef {
    pub device_id: UniqueId,
    pub measurement_id: UniqueId,
}

/// An output + channel pair identifying one switchable channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRef {
    pub output_id: UniqueId,
    pub channel_id: UniqueId,
}

/// One condition attached to a Conditional controller.
///
/// Only the reference fields relevant to `condition_type` are populated;
/// the rest stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionRecord {
    pub unique_id: UniqueId,
    /// The owning Conditional controller
    pub conditional_id: UniqueId,
    pub condition_type: ConditionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement: Option<MeasurementRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpio_pin: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller_id: Option<UniqueId>,
    /// Window for time-bounded lookups
    #[serde(default = "default_max_age")]
    pub max_age: Duration,
}

fn default_max_age() -> Duration {
    Duration::from_secs(360)
}

impl ConditionRecord {
    /// A measurement-backed condition of the given kind
    pub fn measurement(
        conditional_id: UniqueId,
        kind: ConditionKind,
        measurement: MeasurementRef,
        max_age: Duration,
    ) -> Self {
        Self {
            unique_id: UniqueId::new(),
            conditional_id,
            condition_type: kind,
            measurement: Some(measurement),
            gpio_pin: None,
            output: None,
            controller_id: None,
            max_age,
        }
    }
}
