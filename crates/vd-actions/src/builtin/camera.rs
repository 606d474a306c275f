//! Photo and video capture actions
//!
//! Capture is awaited (the attachment path is needed for the chain
//! accumulator), but delivery of the attachment happens at end of chain
//! with the aggregate email. A later capture in the same chain replaces
//! this one's attachment.

use crate::action::{Action, ActionOutput, ActionResult, ActionVars};
use crate::descriptor::{ActionDeps, ActionDescriptor, ActionPlugin};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::error;
use vd_control::{CaptureMode, DeviceControl};
use vd_core::{ActionConfig, Attachment, OptionSpec, UniqueId};
use vd_store::Store;

fn photo_descriptor() -> ActionDescriptor {
    ActionDescriptor {
        name_unique: "photo",
        name: "Camera: Capture Photo",
        message: "Capture a photo and attach it to the chain email",
        usage: "Captures a still with the selected camera. Supply \
                {\"camera_id\": \"<id>\"} as the value to override the configured camera.",
        dependencies: &[],
        custom_options: vec![OptionSpec::select_device(
            "controller",
            "Camera",
            "Select the camera to capture with",
            &["Camera"],
        )],
    }
}

fn video_descriptor() -> ActionDescriptor {
    ActionDescriptor {
        name_unique: "video",
        name: "Camera: Capture Video",
        message: "Capture a video and attach it to the chain email",
        usage: "Captures a video of the configured duration with the selected camera. \
                Supply {\"camera_id\": \"<id>\"} as the value to override the configured camera.",
        dependencies: &[],
        custom_options: vec![
            OptionSpec::select_device(
                "controller",
                "Camera",
                "Select the camera to capture with",
                &["Camera"],
            ),
            OptionSpec::float(
                "duration",
                "Duration (seconds)",
                "How long to record",
                10.0,
            ),
        ],
    }
}

pub fn photo_plugin() -> ActionPlugin {
    ActionPlugin::new(photo_descriptor(), |config, deps| {
        Ok(Box::new(CameraAction::bind(config, deps, None)))
    })
}

pub fn video_plugin() -> ActionPlugin {
    ActionPlugin::new(video_descriptor(), |config, deps| {
        let duration = config.option_f64("duration").unwrap_or(10.0);
        Ok(Box::new(CameraAction::bind(config, deps, Some(duration))))
    })
}

struct CameraAction {
    camera_id: Option<UniqueId>,
    /// None for photo, Some(duration) for video
    video_duration: Option<f64>,
    store: Arc<dyn Store>,
    control: Arc<dyn DeviceControl>,
}

impl CameraAction {
    fn bind(config: &ActionConfig, deps: &ActionDeps, video_duration: Option<f64>) -> Self {
        Self {
            camera_id: config
                .option_str("controller")
                .and_then(|s| UniqueId::parse(s).ok()),
            video_duration,
            store: deps.store.clone(),
            control: deps.control.clone(),
        }
    }
}

#[async_trait]
impl Action for CameraAction {
    fn is_setup(&self) -> bool {
        self.camera_id.is_some()
    }

    async fn run(&self, message: &str, vars: &ActionVars) -> ActionResult<ActionOutput> {
        let camera_id = match vars.get_id("camera_id").or_else(|| self.camera_id.clone()) {
            Some(id) => id,
            None => {
                return Ok(ActionOutput::message(format!(
                    "{} Error: no camera selected.",
                    message
                )))
            }
        };

        let camera = match self.store.camera(&camera_id).await? {
            Some(camera) => camera,
            None => {
                error!(camera = %camera_id, "Camera not found");
                return Ok(ActionOutput::message(format!(
                    "{} Camera not found.",
                    message
                )));
            }
        };

        let (mode, noun, kind) = match self.video_duration {
            Some(duration_sec) => (
                CaptureMode::Video { duration_sec },
                "video",
                "video",
            ),
            None => (CaptureMode::Photo, "photo", "still"),
        };

        let message = format!(
            "{} Capturing {} with camera {} ({}, {}).",
            message,
            noun,
            camera_id,
            camera_id.short(),
            camera.name
        );

        let file = self.control.camera_record(&camera_id, mode).await?;

        Ok(ActionOutput::message(message).with_attachment(Attachment {
            file,
            kind: kind.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vd_control::RecordingControl;
    use vd_core::CameraRecord;
    use vd_store::MemoryStore;

    fn deps_with_camera(camera_id: &UniqueId) -> ActionDeps {
        let store = Arc::new(MemoryStore::new());
        store.insert_camera(CameraRecord {
            unique_id: camera_id.clone(),
            name: "Bench cam".into(),
        });
        ActionDeps {
            store: store.clone(),
            samples: store,
            control: Arc::new(RecordingControl::with_camera_path("/tmp/capture.jpg")),
        }
    }

    fn config(camera_id: &UniqueId) -> ActionConfig {
        let mut options = serde_json::Map::new();
        options.insert("controller".into(), json!(camera_id.as_str()));
        ActionConfig {
            unique_id: UniqueId::new(),
            function_id: UniqueId::new(),
            action_type: "photo".into(),
            options,
            position: 0,
        }
    }

    #[tokio::test]
    async fn test_photo_produces_attachment() {
        let camera_id = UniqueId::new();
        let deps = deps_with_camera(&camera_id);
        let action = CameraAction::bind(&config(&camera_id), &deps, None);

        let output = action.run("Alert.", &ActionVars::none()).await.unwrap();
        let attachment = output.attachment.unwrap();
        assert_eq!(attachment.kind, "still");
        assert!(output.message.contains("Capturing photo with camera"));
        assert!(output.message.contains("Bench cam"));
    }

    #[tokio::test]
    async fn test_video_kind() {
        let camera_id = UniqueId::new();
        let deps = deps_with_camera(&camera_id);
        let action = CameraAction::bind(&config(&camera_id), &deps, Some(5.0));

        let output = action.run("", &ActionVars::none()).await.unwrap();
        assert_eq!(output.attachment.unwrap().kind, "video");
    }

    #[tokio::test]
    async fn test_missing_camera_is_nonfatal() {
        let camera_id = UniqueId::new();
        let deps = deps_with_camera(&camera_id);
        let other = UniqueId::new();
        let action = CameraAction::bind(&config(&other), &deps, None);

        let output = action.run("Alert.", &ActionVars::none()).await.unwrap();
        assert_eq!(output.message, "Alert. Camera not found.");
        assert!(output.attachment.is_none());
    }
}
