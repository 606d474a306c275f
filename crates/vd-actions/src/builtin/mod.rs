//! Builtin action plugins
//!
//! Each module is one independently pluggable action: a descriptor plus
//! an `Action` implementation. [`set`] collects them into the builtin
//! plugin set the deployment registers first.

pub mod camera;
pub mod controller;
pub mod display;
pub mod email;
pub mod input;
pub mod note;
pub mod output;
pub mod pause;
pub mod publish;

use crate::descriptor::ActionSet;

/// The builtin plugin set, in canonical order
pub fn set() -> ActionSet {
    ActionSet::with_plugins(
        "builtin",
        vec![
            pause::plugin(),
            email::plugin(),
            note::plugin(),
            camera::photo_plugin(),
            camera::video_plugin(),
            output::plugin(),
            display::backlight_color_plugin(),
            display::flash_off_plugin(),
            input::force_measurements_plugin(),
            publish::plugin(),
            controller::activate_plugin(),
            controller::deactivate_plugin(),
        ],
    )
}

#[cfg(test)]
mod tests {
    use crate::registry::ActionRegistry;

    #[test]
    fn test_builtin_set_has_no_collisions() {
        let set = super::set();
        let count = set.snapshot().len();
        let registry = ActionRegistry::discover(&[&set], false);
        assert_eq!(registry.len(), count);
    }

    #[test]
    fn test_builtin_names() {
        let set = super::set();
        let registry = ActionRegistry::discover(&[&set], false);
        for name in [
            "pause",
            "email",
            "create_note",
            "photo",
            "video",
            "output_on_off",
            "display_backlight_color",
            "display_flash_off",
            "input_force_measurements",
            "publish_message",
            "activate_controller",
            "deactivate_controller",
        ] {
            assert!(registry.contains(name), "missing builtin {}", name);
        }
    }
}
