//! Pluggable actions for Verdant
//!
//! An action is one configured, named side effect (toggle an output,
//! capture a photo, send an email, create a note) executed as part of a
//! Function's chain. Each action is an independently pluggable unit:
//! a descriptor (metadata plus configuration-option specs) and a factory
//! that binds the plugin to one [`ActionConfig`](vd_core::ActionConfig).
//!
//! # Architecture
//!
//! ```text
//! ActionSet (builtin / custom) → ActionRegistry::discover → ActionExecutor
//! ```
//!
//! - [`Action`] - the plugin contract: `is_setup()` + `run(message, vars)`
//! - [`ActionRegistry`] - validated name → plugin index, rebuilt on demand
//! - [`ActionExecutor`] - instantiates and invokes one plugin by name

mod action;
mod descriptor;
mod executor;
mod registry;

pub mod builtin;

pub use action::{Action, ActionError, ActionOutput, ActionResult, ActionVars};
pub use descriptor::{ActionDeps, ActionDescriptor, ActionFactory, ActionPlugin, ActionSet};
pub use executor::ActionExecutor;
pub use registry::ActionRegistry;
