//! Recording test doubles for the control and mail collaborators

use crate::{CaptureMode, ControlResult, DeviceControl, GpioReader, Mailer};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use vd_core::{Attachment, SmtpConfig, UniqueId};

/// One command received by [`RecordingControl`]
#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    OutputOnOff {
        output_id: UniqueId,
        channel: u32,
        on: bool,
        duration_sec: Option<f64>,
    },
    LcdBacklightColor {
        display_id: UniqueId,
        color: String,
    },
    LcdFlashOff {
        display_id: UniqueId,
    },
    ForceInputMeasurements {
        input_id: UniqueId,
    },
    CameraRecord {
        camera_id: UniqueId,
        mode: CaptureMode,
    },
    PublishMessage {
        topic: String,
        payload: String,
    },
    ActivateController {
        controller_id: UniqueId,
    },
    DeactivateController {
        controller_id: UniqueId,
    },
}

/// A [`DeviceControl`] double that records every command and answers state
/// queries from preconfigured values.
pub struct RecordingControl {
    commands: Mutex<Vec<ControlCommand>>,
    output_states: Mutex<HashMap<String, String>>,
    output_durations: Mutex<HashMap<String, f64>>,
    active_controllers: Mutex<Vec<UniqueId>>,
    camera_path: PathBuf,
}

impl RecordingControl {
    pub fn new() -> Self {
        Self {
            commands: Mutex::new(Vec::new()),
            output_states: Mutex::new(HashMap::new()),
            output_durations: Mutex::new(HashMap::new()),
            active_controllers: Mutex::new(Vec::new()),
            camera_path: PathBuf::from("/var/lib/verdant/camera/capture.jpg"),
        }
    }

    pub fn with_camera_path(path: impl Into<PathBuf>) -> Self {
        Self {
            camera_path: path.into(),
            ..Self::new()
        }
    }

    pub fn set_output_state(&self, output_id: &UniqueId, channel: u32, state: &str) {
        self.output_states
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(format!("{}/{}", output_id, channel), state.to_string());
    }

    pub fn set_output_duration(&self, output_id: &UniqueId, channel: u32, seconds: f64) {
        self.output_durations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(format!("{}/{}", output_id, channel), seconds);
    }

    pub fn set_controller_active(&self, controller_id: &UniqueId) {
        self.active_controllers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(controller_id.clone());
    }

    /// All commands received so far, in arrival order
    pub fn commands(&self) -> Vec<ControlCommand> {
        self.commands
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn record(&self, command: ControlCommand) {
        self.commands
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(command);
    }
}

impl Default for RecordingControl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeviceControl for RecordingControl {
    async fn output_state(&self, output_id: &UniqueId, channel: u32) -> ControlResult<String> {
        Ok(self
            .output_states
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&format!("{}/{}", output_id, channel))
            .cloned()
            .unwrap_or_else(|| "off".to_string()))
    }

    async fn output_sec_currently_on(
        &self,
        output_id: &UniqueId,
        channel: u32,
    ) -> ControlResult<f64> {
        Ok(self
            .output_durations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&format!("{}/{}", output_id, channel))
            .copied()
            .unwrap_or(0.0))
    }

    async fn controller_is_active(&self, controller_id: &UniqueId) -> ControlResult<bool> {
        Ok(self
            .active_controllers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(controller_id))
    }

    async fn output_on_off(
        &self,
        output_id: &UniqueId,
        channel: u32,
        on: bool,
        duration_sec: Option<f64>,
    ) -> ControlResult<()> {
        self.record(ControlCommand::OutputOnOff {
            output_id: output_id.clone(),
            channel,
            on,
            duration_sec,
        });
        Ok(())
    }

    async fn lcd_backlight_color(&self, display_id: &UniqueId, color: &str) -> ControlResult<()> {
        self.record(ControlCommand::LcdBacklightColor {
            display_id: display_id.clone(),
            color: color.to_string(),
        });
        Ok(())
    }

    async fn lcd_flash_off(&self, display_id: &UniqueId) -> ControlResult<()> {
        self.record(ControlCommand::LcdFlashOff {
            display_id: display_id.clone(),
        });
        Ok(())
    }

    async fn force_input_measurements(&self, input_id: &UniqueId) -> ControlResult<()> {
        self.record(ControlCommand::ForceInputMeasurements {
            input_id: input_id.clone(),
        });
        Ok(())
    }

    async fn camera_record(
        &self,
        camera_id: &UniqueId,
        mode: CaptureMode,
    ) -> ControlResult<PathBuf> {
        self.record(ControlCommand::CameraRecord {
            camera_id: camera_id.clone(),
            mode,
        });
        Ok(self.camera_path.clone())
    }

    async fn publish_message(&self, topic: &str, payload: &str) -> ControlResult<()> {
        self.record(ControlCommand::PublishMessage {
            topic: topic.to_string(),
            payload: payload.to_string(),
        });
        Ok(())
    }

    async fn activate_controller(&self, controller_id: &UniqueId) -> ControlResult<()> {
        self.record(ControlCommand::ActivateController {
            controller_id: controller_id.clone(),
        });
        Ok(())
    }

    async fn deactivate_controller(&self, controller_id: &UniqueId) -> ControlResult<()> {
        self.record(ControlCommand::DeactivateController {
            controller_id: controller_id.clone(),
        });
        Ok(())
    }
}

/// One email received by [`RecordingMailer`]
#[derive(Debug, Clone, PartialEq)]
pub struct SentEmail {
    pub recipients: Vec<String>,
    pub body: String,
    pub attachment: Option<Attachment>,
}

/// A [`Mailer`] double that records every send
pub struct RecordingMailer {
    sent: Mutex<Vec<SentEmail>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for RecordingMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(
        &self,
        _config: &SmtpConfig,
        recipients: &[String],
        body: &str,
        attachment: Option<&Attachment>,
    ) -> ControlResult<()> {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(SentEmail {
                recipients: recipients.to_vec(),
                body: body.to_string(),
                attachment: attachment.cloned(),
            });
        Ok(())
    }
}

/// A [`GpioReader`] with fixed pin levels; unknown pins fail the read
pub struct StaticGpio {
    levels: HashMap<u8, u8>,
}

impl StaticGpio {
    pub fn new(levels: impl IntoIterator<Item = (u8, u8)>) -> Self {
        Self {
            levels: levels.into_iter().collect(),
        }
    }
}

impl GpioReader for StaticGpio {
    fn read(&self, pin: u8) -> ControlResult<u8> {
        self.levels
            .get(&pin)
            .copied()
            .ok_or_else(|| crate::ControlError::HardwareRead(format!("no such pin {}", pin)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_control_records_in_order() {
        let control = RecordingControl::new();
        let display = UniqueId::new();
        let input = UniqueId::new();

        control.lcd_flash_off(&display).await.unwrap();
        control.force_input_measurements(&input).await.unwrap();

        let commands = control.commands();
        assert_eq!(commands.len(), 2);
        assert_eq!(
            commands[0],
            ControlCommand::LcdFlashOff {
                display_id: display
            }
        );
    }

    #[tokio::test]
    async fn test_output_state_defaults_off() {
        let control = RecordingControl::new();
        let output = UniqueId::new();
        assert_eq!(control.output_state(&output, 0).await.unwrap(), "off");

        control.set_output_state(&output, 0, "on");
        assert_eq!(control.output_state(&output, 0).await.unwrap(), "on");
    }

    #[test]
    fn test_static_gpio() {
        let gpio = StaticGpio::new([(17, 1)]);
        assert_eq!(gpio.read(17).unwrap(), 1);
        assert!(gpio.read(4).is_err());
    }
}
