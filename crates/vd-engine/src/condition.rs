//! Condition value resolution
//!
//! Produces the current value of one condition for the upstream
//! conditional-evaluation subsystem. Every failure local to one
//! condition stays local: hardware reads are best effort, unknown
//! conditions yield `None`. The one hard failure is an aggregate over an
//! empty sample window, which must never silently become a number.

use std::sync::Arc;
use thiserror::Error;
use tracing::error;
use vd_control::{DeviceControl, GpioReader};
use vd_core::{ConditionKind, ConditionRecord, UniqueId};
use vd_store::{Sample, SampleStore, Store};

/// Condition resolution errors
#[derive(Debug, Error)]
pub enum ConditionError {
    /// A historical average/sum was requested over a window containing
    /// no samples. Deliberately an error: returning 0 would let the
    /// caller mistake "no data" for a measurement.
    #[error("no samples within the window for condition {condition}")]
    EmptySampleSet { condition: UniqueId },

    #[error(transparent)]
    Store(#[from] vd_store::StoreError),

    #[error(transparent)]
    Control(#[from] vd_control::ControlError),
}

/// The value a condition currently has
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionValue {
    Float(f64),
    Bool(bool),
    Text(String),
    /// Raw pin level, 0 or 1
    Level(u8),
    /// Full sample series, oldest first
    Series(Vec<Sample>),
}

impl ConditionValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConditionValue::Float(v) => Some(*v),
            ConditionValue::Level(v) => Some(f64::from(*v)),
            _ => None,
        }
    }
}

/// Pluggable evaluator producing a current value for a condition.
pub struct ConditionValueResolver {
    store: Arc<dyn Store>,
    samples: Arc<dyn SampleStore>,
    control: Arc<dyn DeviceControl>,
    gpio: Arc<dyn GpioReader>,
}

impl ConditionValueResolver {
    pub fn new(
        store: Arc<dyn Store>,
        samples: Arc<dyn SampleStore>,
        control: Arc<dyn DeviceControl>,
        gpio: Arc<dyn GpioReader>,
    ) -> Self {
        Self {
            store,
            samples,
            control,
            gpio,
        }
    }

    /// Evaluate a condition to its current value.
    ///
    /// `Ok(None)` means the value could not be produced for a non-fatal
    /// reason: unknown condition id, no recent sample, a failed hardware
    /// read, or a condition missing its reference fields.
    pub async fn evaluate(
        &self,
        condition_id: &UniqueId,
    ) -> Result<Option<ConditionValue>, ConditionError> {
        let condition = match self.store.condition(condition_id).await? {
            Some(condition) => condition,
            None => {
                error!(condition = %condition_id, "Condition ID not found");
                return Ok(None);
            }
        };

        match condition.condition_type {
            ConditionKind::Measurement => self.last_measurement(&condition).await,
            ConditionKind::MeasurementPastAverage => {
                let samples = self.past_samples(&condition).await?;
                match samples {
                    None => Ok(None),
                    Some(samples) if samples.is_empty() => Err(ConditionError::EmptySampleSet {
                        condition: condition.unique_id.clone(),
                    }),
                    Some(samples) => {
                        let sum: f64 = samples.iter().map(|s| s.value).sum();
                        Ok(Some(ConditionValue::Float(sum / samples.len() as f64)))
                    }
                }
            }
            ConditionKind::MeasurementPastSum => {
                let samples = self.past_samples(&condition).await?;
                match samples {
                    None => Ok(None),
                    Some(samples) if samples.is_empty() => Err(ConditionError::EmptySampleSet {
                        condition: condition.unique_id.clone(),
                    }),
                    Some(samples) => Ok(Some(ConditionValue::Float(
                        samples.iter().map(|s| s.value).sum(),
                    ))),
                }
            }
            ConditionKind::MeasurementSeries => {
                Ok(self.past_samples(&condition).await?.map(ConditionValue::Series))
            }
            ConditionKind::GpioState => {
                let pin = match condition.gpio_pin {
                    Some(pin) => pin,
                    None => {
                        error!(condition = %condition_id, "GPIO condition without a pin");
                        return Ok(None);
                    }
                };
                match self.gpio.read(pin) {
                    Ok(level) => Ok(Some(ConditionValue::Level(level))),
                    Err(e) => {
                        error!(pin, error = %e, "Exception reading the GPIO pin");
                        Ok(None)
                    }
                }
            }
            ConditionKind::OutputState => match self.output_channel(&condition).await? {
                Some((output_id, channel)) => {
                    let state = self.control.output_state(&output_id, channel).await?;
                    Ok(Some(ConditionValue::Text(state)))
                }
                None => Ok(None),
            },
            ConditionKind::OutputDurationOn => match self.output_channel(&condition).await? {
                Some((output_id, channel)) => {
                    let seconds = self
                        .control
                        .output_sec_currently_on(&output_id, channel)
                        .await?;
                    Ok(Some(ConditionValue::Float(seconds)))
                }
                None => Ok(None),
            },
            ConditionKind::ControllerStatus => {
                let controller_id = match &condition.controller_id {
                    Some(id) => id,
                    None => {
                        error!(condition = %condition_id, "Status condition without a controller");
                        return Ok(None);
                    }
                };
                let active = self.control.controller_is_active(controller_id).await?;
                Ok(Some(ConditionValue::Bool(active)))
            }
        }
    }

    async fn last_measurement(
        &self,
        condition: &ConditionRecord,
    ) -> Result<Option<ConditionValue>, ConditionError> {
        let measurement = match &condition.measurement {
            Some(m) => m,
            None => {
                error!(condition = %condition.unique_id, "Measurement condition without a measurement");
                return Ok(None);
            }
        };
        let sample = self
            .samples
            .last_within(
                &measurement.device_id,
                &measurement.measurement_id,
                condition.max_age,
            )
            .await?;
        Ok(sample.map(|s| ConditionValue::Float(s.value)))
    }

    async fn past_samples(
        &self,
        condition: &ConditionRecord,
    ) -> Result<Option<Vec<Sample>>, ConditionError> {
        let measurement = match &condition.measurement {
            Some(m) => m,
            None => {
                error!(condition = %condition.unique_id, "Measurement condition without a measurement");
                return Ok(None);
            }
        };
        Ok(Some(
            self.samples
                .past_within(
                    &measurement.device_id,
                    &measurement.measurement_id,
                    condition.max_age,
                )
                .await?,
        ))
    }

    async fn output_channel(
        &self,
        condition: &ConditionRecord,
    ) -> Result<Option<(UniqueId, u32)>, ConditionError> {
        let output = match &condition.output {
            Some(output) => output,
            None => {
                error!(condition = %condition.unique_id, "Output condition without an output");
                return Ok(None);
            }
        };
        match self.store.output_channel(&output.channel_id).await? {
            Some(channel) => Ok(Some((output.output_id.clone(), channel.channel))),
            None => {
                error!(channel = %output.channel_id, "Output channel not found");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;
    use vd_control::{RecordingControl, StaticGpio};
    use vd_core::{MeasurementRef, OutputChannelRecord, OutputRef};
    use vd_store::MemoryStore;

    struct Fixture {
        store: Arc<MemoryStore>,
        control: Arc<RecordingControl>,
        resolver: ConditionValueResolver,
    }

    fn fixture() -> Fixture {
        fixture_with_gpio(StaticGpio::new([]))
    }

    fn fixture_with_gpio(gpio: StaticGpio) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let control = Arc::new(RecordingControl::new());
        let resolver = ConditionValueResolver::new(
            store.clone(),
            store.clone(),
            control.clone(),
            Arc::new(gpio),
        );
        Fixture {
            store,
            control,
            resolver,
        }
    }

    fn measurement_condition(kind: ConditionKind) -> (ConditionRecord, MeasurementRef) {
        let measurement = MeasurementRef {
            device_id: UniqueId::new(),
            measurement_id: UniqueId::new(),
        };
        let condition = ConditionRecord::measurement(
            UniqueId::new(),
            kind,
            measurement.clone(),
            Duration::from_secs(600),
        );
        (condition, measurement)
    }

    #[tokio::test]
    async fn test_unknown_condition_is_none() {
        let f = fixture();
        let value = f.resolver.evaluate(&UniqueId::new()).await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_last_measurement() {
        let f = fixture();
        let (condition, measurement) = measurement_condition(ConditionKind::Measurement);
        f.store.insert_condition(condition.clone());
        f.store.add_sample(
            &measurement.device_id,
            &measurement.measurement_id,
            Sample::new(Utc::now(), 23.4),
        );

        let value = f.resolver.evaluate(&condition.unique_id).await.unwrap();
        assert_eq!(value, Some(ConditionValue::Float(23.4)));
    }

    #[tokio::test]
    async fn test_measurement_outside_window_is_none() {
        let f = fixture();
        let (condition, measurement) = measurement_condition(ConditionKind::Measurement);
        f.store.insert_condition(condition.clone());
        f.store.add_sample(
            &measurement.device_id,
            &measurement.measurement_id,
            Sample::new(Utc::now() - chrono::Duration::hours(2), 23.4),
        );

        let value = f.resolver.evaluate(&condition.unique_id).await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_past_average() {
        let f = fixture();
        let (condition, measurement) =
            measurement_condition(ConditionKind::MeasurementPastAverage);
        f.store.insert_condition(condition.clone());
        for value in [1.0, 2.0, 3.0] {
            f.store.add_sample(
                &measurement.device_id,
                &measurement.measurement_id,
                Sample::new(Utc::now(), value),
            );
        }

        let value = f.resolver.evaluate(&condition.unique_id).await.unwrap();
        assert_eq!(value, Some(ConditionValue::Float(2.0)));
    }

    #[tokio::test]
    async fn test_empty_average_is_explicit_failure() {
        let f = fixture();
        let (condition, _) = measurement_condition(ConditionKind::MeasurementPastAverage);
        f.store.insert_condition(condition.clone());

        let result = f.resolver.evaluate(&condition.unique_id).await;
        assert!(matches!(
            result,
            Err(ConditionError::EmptySampleSet { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_sum_is_explicit_failure() {
        let f = fixture();
        let (condition, _) = measurement_condition(ConditionKind::MeasurementPastSum);
        f.store.insert_condition(condition.clone());

        assert!(matches!(
            f.resolver.evaluate(&condition.unique_id).await,
            Err(ConditionError::EmptySampleSet { .. })
        ));
    }

    #[tokio::test]
    async fn test_series() {
        let f = fixture();
        let (condition, measurement) = measurement_condition(ConditionKind::MeasurementSeries);
        f.store.insert_condition(condition.clone());
        f.store.add_sample(
            &measurement.device_id,
            &measurement.measurement_id,
            Sample::new(Utc::now(), 7.0),
        );

        match f.resolver.evaluate(&condition.unique_id).await.unwrap() {
            Some(ConditionValue::Series(series)) => assert_eq!(series.len(), 1),
            other => panic!("expected series, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_gpio_read_failure_is_none() {
        let f = fixture_with_gpio(StaticGpio::new([(17, 1)]));

        let mut condition = measurement_condition(ConditionKind::GpioState).0;
        condition.measurement = None;
        condition.gpio_pin = Some(4); // not wired in the fixture
        f.store.insert_condition(condition.clone());

        let value = f.resolver.evaluate(&condition.unique_id).await.unwrap();
        assert!(value.is_none());

        condition.gpio_pin = Some(17);
        f.store.insert_condition(condition.clone());
        let value = f.resolver.evaluate(&condition.unique_id).await.unwrap();
        assert_eq!(value, Some(ConditionValue::Level(1)));
    }

    #[tokio::test]
    async fn test_output_state_delegates_to_control() {
        let f = fixture();
        let output_id = UniqueId::new();
        let channel_id = UniqueId::new();
        f.store.insert_output_channel(OutputChannelRecord {
            unique_id: channel_id.clone(),
            output_id: output_id.clone(),
            channel: 1,
        });
        f.control.set_output_state(&output_id, 1, "on");

        let mut condition = measurement_condition(ConditionKind::OutputState).0;
        condition.measurement = None;
        condition.output = Some(OutputRef {
            output_id,
            channel_id,
        });
        f.store.insert_condition(condition.clone());

        let value = f.resolver.evaluate(&condition.unique_id).await.unwrap();
        assert_eq!(value, Some(ConditionValue::Text("on".into())));
    }

    #[tokio::test]
    async fn test_controller_status() {
        let f = fixture();
        let controller_id = UniqueId::new();
        f.control.set_controller_active(&controller_id);

        let mut condition = measurement_condition(ConditionKind::ControllerStatus).0;
        condition.measurement = None;
        condition.controller_id = Some(controller_id);
        f.store.insert_condition(condition.clone());

        let value = f.resolver.evaluate(&condition.unique_id).await.unwrap();
        assert_eq!(value, Some(ConditionValue::Bool(true)));
    }
}
