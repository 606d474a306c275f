//! Create note: accumulate tags for the end-of-chain note
//!
//! Like the email action this only feeds the accumulator; the chain
//! runner creates exactly one note per run, tagged with every valid tag
//! accumulated across all actions.

use crate::action::{Action, ActionOutput, ActionResult, ActionVars};
use crate::descriptor::{ActionDescriptor, ActionPlugin};
use async_trait::async_trait;
use serde_json::Value;
use vd_core::{ActionConfig, OptionSpec, UniqueId};

fn descriptor() -> ActionDescriptor {
    ActionDescriptor {
        name_unique: "create_note",
        name: "Create Note",
        message: "Create a note with the chain message as its body",
        usage: "Adds the configured tags to the chain's tag list. One note is \
                created after the full chain has run if at least one accumulated \
                tag still exists. Supply {\"tags\": [\"<tag id>\"]} as the value \
                to override the configured tags.",
        dependencies: &[],
        custom_options: vec![OptionSpec::text(
            "tags",
            "Note Tags",
            "Comma-separated tag ids to attach to the note",
            "",
        )],
    }
}

pub fn plugin() -> ActionPlugin {
    ActionPlugin::new(descriptor(), |config, _deps| {
        Ok(Box::new(NoteAction::bind(config)))
    })
}

struct NoteAction {
    tags: Vec<UniqueId>,
}

/// Tags may be configured as a comma-separated string or supplied as a
/// JSON array in the override.
fn parse_tags(value: &Value) -> Vec<UniqueId> {
    match value {
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| UniqueId::parse(s).ok())
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .filter_map(|s| UniqueId::parse(s).ok())
            .collect(),
        _ => Vec::new(),
    }
}

impl NoteAction {
    fn bind(config: &ActionConfig) -> Self {
        Self {
            tags: config.option("tags").map(parse_tags).unwrap_or_default(),
        }
    }
}

#[async_trait]
impl Action for NoteAction {
    fn is_setup(&self) -> bool {
        !self.tags.is_empty()
    }

    async fn run(&self, message: &str, vars: &ActionVars) -> ActionResult<ActionOutput> {
        let tags = vars
            .get("tags")
            .map(parse_tags)
            .unwrap_or_else(|| self.tags.clone());

        let tag_list = tags
            .iter()
            .map(|t| t.short().to_string())
            .collect::<Vec<_>>()
            .join(", ");

        Ok(
            ActionOutput::message(format!("{} Create note with tag(s) {}.", message, tag_list))
                .with_note_tags(tags),
        )
    }
}
