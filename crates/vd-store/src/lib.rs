//! Persistence collaborator traits for Verdant
//!
//! The engine does not own a database. This crate defines the read/write
//! surface the engine needs from whatever persistence layer hosts it,
//! plus [`MemoryStore`], a dashmap-backed implementation used by tests
//! and by embedders that keep configuration in memory.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;
use vd_core::{
    ActionConfig, CameraRecord, ConditionRecord, ConditionalRecord, DisplayRecord, FunctionRecord,
    InputRecord, MathRecord, NoteRecord, NoteTagRecord, OutputChannelRecord, PidRecord,
    SmtpConfig, SmtpGateState, TriggerRecord, UniqueId,
};

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("no SMTP configuration present")]
    NoSmtpConfig,

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// One time-series sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub time: DateTime<Utc>,
    pub value: f64,
}

impl Sample {
    pub fn new(time: DateTime<Utc>, value: f64) -> Self {
        Self { time, value }
    }
}

/// Lookup-by-id and lookup-by-parent access to the automation
/// configuration, plus the few writes the engine performs (notes and the
/// notification-gate counters).
///
/// Absent records are `Ok(None)`, never errors; `Err` is reserved for the
/// backend itself failing.
#[async_trait]
pub trait Store: Send + Sync {
    async fn action(&self, id: &UniqueId) -> StoreResult<Option<ActionConfig>>;

    /// The ordered action list owned by a Function
    async fn actions_for_function(&self, function_id: &UniqueId)
        -> StoreResult<Vec<ActionConfig>>;

    async fn conditional(&self, id: &UniqueId) -> StoreResult<Option<ConditionalRecord>>;
    async fn function(&self, id: &UniqueId) -> StoreResult<Option<FunctionRecord>>;
    async fn input(&self, id: &UniqueId) -> StoreResult<Option<InputRecord>>;
    async fn display(&self, id: &UniqueId) -> StoreResult<Option<DisplayRecord>>;
    async fn math(&self, id: &UniqueId) -> StoreResult<Option<MathRecord>>;
    async fn pid(&self, id: &UniqueId) -> StoreResult<Option<PidRecord>>;
    async fn trigger(&self, id: &UniqueId) -> StoreResult<Option<TriggerRecord>>;
    async fn camera(&self, id: &UniqueId) -> StoreResult<Option<CameraRecord>>;
    async fn output_channel(&self, id: &UniqueId) -> StoreResult<Option<OutputChannelRecord>>;
    async fn note_tag(&self, id: &UniqueId) -> StoreResult<Option<NoteTagRecord>>;
    async fn condition(&self, id: &UniqueId) -> StoreResult<Option<ConditionRecord>>;

    async fn smtp_config(&self) -> StoreResult<SmtpConfig>;

    /// Current notification-gate counters.
    ///
    /// Callers that read-modify-write must serialize through the
    /// NotificationGate; the store itself only loads and saves.
    async fn smtp_gate_state(&self) -> StoreResult<SmtpGateState>;
    async fn save_smtp_gate_state(&self, state: SmtpGateState) -> StoreResult<()>;

    /// Persist one note created at the end of a chain run
    async fn add_note(&self, note: NoteRecord) -> StoreResult<()>;
}

/// Read access to the measurement time series.
#[async_trait]
pub trait SampleStore: Send + Sync {
    /// Most recent sample within `max_age`, if any
    async fn last_within(
        &self,
        device_id: &UniqueId,
        measurement_id: &UniqueId,
        max_age: Duration,
    ) -> StoreResult<Option<Sample>>;

    /// All samples within `max_age`, oldest first
    async fn past_within(
        &self,
        device_id: &UniqueId,
        measurement_id: &UniqueId,
        max_age: Duration,
    ) -> StoreResult<Vec<Sample>>;
}
