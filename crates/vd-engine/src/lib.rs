//! Verdant engine
//!
//! The dispatch core of the controller: given that a condition has fired
//! for a Function, run the Function's ordered action chain, accumulate
//! shared side-effect state across it, and perform the end-of-chain
//! aggregate operations (one gated email send, one note).
//!
//! # Architecture
//!
//! ```text
//! scheduler (external) → ChainRunner → ActionExecutor → action plugins
//!                            │
//!                            ├─ NotificationGate  (rate-limited email)
//!                            └─ Store             (notes, configuration)
//! ```
//!
//! The condition value resolver and controller resolver live here too;
//! the upstream conditional-evaluation subsystem uses them to decide
//! *whether* a chain should run, which is outside this crate's scope.

mod chain;
mod condition;
mod gate;
mod resolver;

pub use chain::{ChainContext, ChainRunner, SKIP_IN_CHAIN};
pub use condition::{ConditionError, ConditionValue, ConditionValueResolver};
pub use gate::NotificationGate;
pub use resolver::resolve_controller;

use thiserror::Error;

/// Engine-fatal errors: the persistence collaborator itself failing.
/// Failures local to one action or one condition never surface here;
/// they become message suffixes or `None` values, and control/mail
/// failures are logged and swallowed by the chain runner.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] vd_store::StoreError),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
