//! Device-control and outbound-mail collaborators
//!
//! Actions and the condition resolver never touch hardware directly; they
//! go through [`DeviceControl`], the client surface of the controller
//! daemon. Commands that drive hardware are detached on the daemon side:
//! a returned `Ok` acknowledges dispatch, not completion.
//!
//! [`RecordingControl`] and [`RecordingMailer`] are the doubles the engine
//! test suites are written against.

mod recording;

pub use recording::{ControlCommand, RecordingControl, RecordingMailer, SentEmail, StaticGpio};

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use vd_core::{Attachment, SmtpConfig, UniqueId};

/// Errors from the control and mail collaborators
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("daemon unreachable: {0}")]
    Unreachable(String),

    #[error("hardware read failed: {0}")]
    HardwareRead(String),

    #[error("mail delivery failed: {0}")]
    Mail(String),

    #[error("command rejected: {0}")]
    Rejected(String),
}

/// Result type for control operations
pub type ControlResult<T> = Result<T, ControlError>;

/// What a camera capture should produce
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CaptureMode {
    Photo,
    /// Video capture of the given duration in seconds
    Video { duration_sec: f64 },
}

/// Client surface of the controller daemon.
///
/// State queries (`output_state`, `output_sec_currently_on`,
/// `controller_is_active`) are synchronous round trips. Everything else is
/// dispatched to run independently of the caller.
#[async_trait]
pub trait DeviceControl: Send + Sync {
    /// Current state of an output channel, e.g. "on" / "off"
    async fn output_state(&self, output_id: &UniqueId, channel: u32) -> ControlResult<String>;

    /// Seconds the output channel has currently been on, 0 if off
    async fn output_sec_currently_on(
        &self,
        output_id: &UniqueId,
        channel: u32,
    ) -> ControlResult<f64>;

    async fn controller_is_active(&self, controller_id: &UniqueId) -> ControlResult<bool>;

    async fn output_on_off(
        &self,
        output_id: &UniqueId,
        channel: u32,
        on: bool,
        duration_sec: Option<f64>,
    ) -> ControlResult<()>;

    async fn lcd_backlight_color(&self, display_id: &UniqueId, color: &str) -> ControlResult<()>;

    async fn lcd_flash_off(&self, display_id: &UniqueId) -> ControlResult<()>;

    /// Ask an input controller to acquire measurements now
    async fn force_input_measurements(&self, input_id: &UniqueId) -> ControlResult<()>;

    /// Capture a photo or video; returns the path of the produced file
    async fn camera_record(
        &self,
        camera_id: &UniqueId,
        mode: CaptureMode,
    ) -> ControlResult<PathBuf>;

    /// Publish on the outbound message protocol
    async fn publish_message(&self, topic: &str, payload: &str) -> ControlResult<()>;

    async fn activate_controller(&self, controller_id: &UniqueId) -> ControlResult<()>;

    async fn deactivate_controller(&self, controller_id: &UniqueId) -> ControlResult<()>;
}

/// Raw hardware pin access, best effort.
pub trait GpioReader: Send + Sync {
    /// Read the level of a pin (0 or 1)
    fn read(&self, pin: u8) -> ControlResult<u8>;
}

/// Outbound email delivery.
///
/// One call is one delivery attempt; the engine logs failures and never
/// retries.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        config: &SmtpConfig,
        recipients: &[String],
        body: &str,
        attachment: Option<&Attachment>,
    ) -> ControlResult<()>;
}
