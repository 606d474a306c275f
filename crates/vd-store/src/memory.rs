//! In-memory store backed by dashmap tables

use crate::{Sample, SampleStore, Store, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::RwLock;
use std::time::Duration;
use tracing::debug;
use vd_core::{
    ActionConfig, CameraRecord, ConditionRecord, ConditionalRecord, DisplayRecord, FunctionRecord,
    InputRecord, MathRecord, NoteRecord, NoteTagRecord, OutputChannelRecord, PidRecord,
    SmtpConfig, SmtpGateState, TriggerRecord, UniqueId,
};

/// In-memory implementation of [`Store`] and [`SampleStore`].
///
/// Tables are keyed by the id string. The gate counters live behind an
/// RwLock; serialization of gate read-modify-write cycles is the
/// NotificationGate's job, not this store's.
pub struct MemoryStore {
    actions: DashMap<String, ActionConfig>,
    conditionals: DashMap<String, ConditionalRecord>,
    functions: DashMap<String, FunctionRecord>,
    inputs: DashMap<String, InputRecord>,
    displays: DashMap<String, DisplayRecord>,
    maths: DashMap<String, MathRecord>,
    pids: DashMap<String, PidRecord>,
    triggers: DashMap<String, TriggerRecord>,
    cameras: DashMap<String, CameraRecord>,
    output_channels: DashMap<String, OutputChannelRecord>,
    note_tags: DashMap<String, NoteTagRecord>,
    conditions: DashMap<String, ConditionRecord>,
    notes: RwLock<Vec<NoteRecord>>,
    samples: DashMap<(String, String), Vec<Sample>>,
    smtp: RwLock<Option<SmtpConfig>>,
    gate_state: RwLock<SmtpGateState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            actions: DashMap::new(),
            conditionals: DashMap::new(),
            functions: DashMap::new(),
            inputs: DashMap::new(),
            displays: DashMap::new(),
            maths: DashMap::new(),
            pids: DashMap::new(),
            triggers: DashMap::new(),
            cameras: DashMap::new(),
            output_channels: DashMap::new(),
            note_tags: DashMap::new(),
            conditions: DashMap::new(),
            notes: RwLock::new(Vec::new()),
            samples: DashMap::new(),
            smtp: RwLock::new(None),
            gate_state: RwLock::new(SmtpGateState {
                email_count: 0,
                window_reset_at: Utc::now(),
            }),
        }
    }

    pub fn insert_action(&self, action: ActionConfig) {
        self.actions.insert(action.unique_id.to_string(), action);
    }

    pub fn insert_conditional(&self, record: ConditionalRecord) {
        self.conditionals.insert(record.unique_id.to_string(), record);
    }

    pub fn insert_function(&self, record: FunctionRecord) {
        self.functions.insert(record.unique_id.to_string(), record);
    }

    pub fn insert_input(&self, record: InputRecord) {
        self.inputs.insert(record.unique_id.to_string(), record);
    }

    pub fn insert_display(&self, record: DisplayRecord) {
        self.displays.insert(record.unique_id.to_string(), record);
    }

    pub fn insert_math(&self, record: MathRecord) {
        self.maths.insert(record.unique_id.to_string(), record);
    }

    pub fn insert_pid(&self, record: PidRecord) {
        self.pids.insert(record.unique_id.to_string(), record);
    }

    pub fn insert_trigger(&self, record: TriggerRecord) {
        self.triggers.insert(record.unique_id.to_string(), record);
    }

    pub fn insert_camera(&self, record: CameraRecord) {
        self.cameras.insert(record.unique_id.to_string(), record);
    }

    pub fn insert_output_channel(&self, record: OutputChannelRecord) {
        self.output_channels
            .insert(record.unique_id.to_string(), record);
    }

    pub fn insert_note_tag(&self, record: NoteTagRecord) {
        self.note_tags.insert(record.unique_id.to_string(), record);
    }

    pub fn insert_condition(&self, record: ConditionRecord) {
        self.conditions.insert(record.unique_id.to_string(), record);
    }

    pub fn set_smtp_config(&self, config: SmtpConfig) {
        *self.smtp.write().unwrap_or_else(|e| e.into_inner()) = Some(config);
    }

    /// Append one sample to a device/measurement series
    pub fn add_sample(&self, device_id: &UniqueId, measurement_id: &UniqueId, sample: Sample) {
        self.samples
            .entry((device_id.to_string(), measurement_id.to_string()))
            .or_default()
            .push(sample);
    }

    /// Notes created so far, for assertions in tests
    pub fn notes(&self) -> Vec<NoteRecord> {
        self.notes.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn action(&self, id: &UniqueId) -> StoreResult<Option<ActionConfig>> {
        Ok(self.actions.get(id.as_str()).map(|r| r.clone()))
    }

    async fn actions_for_function(
        &self,
        function_id: &UniqueId,
    ) -> StoreResult<Vec<ActionConfig>> {
        let mut actions: Vec<ActionConfig> = self
            .actions
            .iter()
            .filter(|r| &r.function_id == function_id)
            .map(|r| r.clone())
            .collect();
        actions.sort_by_key(|a| a.position);
        Ok(actions)
    }

    async fn conditional(&self, id: &UniqueId) -> StoreResult<Option<ConditionalRecord>> {
        Ok(self.conditionals.get(id.as_str()).map(|r| r.clone()))
    }

    async fn function(&self, id: &UniqueId) -> StoreResult<Option<FunctionRecord>> {
        Ok(self.functions.get(id.as_str()).map(|r| r.clone()))
    }

    async fn input(&self, id: &UniqueId) -> StoreResult<Option<InputRecord>> {
        Ok(self.inputs.get(id.as_str()).map(|r| r.clone()))
    }

    async fn display(&self, id: &UniqueId) -> StoreResult<Option<DisplayRecord>> {
        Ok(self.displays.get(id.as_str()).map(|r| r.clone()))
    }

    async fn math(&self, id: &UniqueId) -> StoreResult<Option<MathRecord>> {
        Ok(self.maths.get(id.as_str()).map(|r| r.clone()))
    }

    async fn pid(&self, id: &UniqueId) -> StoreResult<Option<PidRecord>> {
        Ok(self.pids.get(id.as_str()).map(|r| r.clone()))
    }

    async fn trigger(&self, id: &UniqueId) -> StoreResult<Option<TriggerRecord>> {
        Ok(self.triggers.get(id.as_str()).map(|r| r.clone()))
    }

    async fn camera(&self, id: &UniqueId) -> StoreResult<Option<CameraRecord>> {
        Ok(self.cameras.get(id.as_str()).map(|r| r.clone()))
    }

    async fn output_channel(&self, id: &UniqueId) -> StoreResult<Option<OutputChannelRecord>> {
        Ok(self.output_channels.get(id.as_str()).map(|r| r.clone()))
    }

    async fn note_tag(&self, id: &UniqueId) -> StoreResult<Option<NoteTagRecord>> {
        Ok(self.note_tags.get(id.as_str()).map(|r| r.clone()))
    }

    async fn condition(&self, id: &UniqueId) -> StoreResult<Option<ConditionRecord>> {
        Ok(self.conditions.get(id.as_str()).map(|r| r.clone()))
    }

    async fn smtp_config(&self) -> StoreResult<SmtpConfig> {
        self.smtp
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(StoreError::NoSmtpConfig)
    }

    async fn smtp_gate_state(&self) -> StoreResult<SmtpGateState> {
        Ok(*self.gate_state.read().unwrap_or_else(|e| e.into_inner()))
    }

    async fn save_smtp_gate_state(&self, state: SmtpGateState) -> StoreResult<()> {
        *self.gate_state.write().unwrap_or_else(|e| e.into_inner()) = state;
        Ok(())
    }

    async fn add_note(&self, note: NoteRecord) -> StoreResult<()> {
        debug!(note = %note.unique_id, tags = note.tags.len(), "Adding note");
        self.notes
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(note);
        Ok(())
    }
}

#[async_trait]
impl SampleStore for MemoryStore {
    async fn last_within(
        &self,
        device_id: &UniqueId,
        measurement_id: &UniqueId,
        max_age: Duration,
    ) -> StoreResult<Option<Sample>> {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(max_age).unwrap_or_else(|_| chrono::Duration::zero());
        Ok(self
            .samples
            .get(&(device_id.to_string(), measurement_id.to_string()))
            .and_then(|series| {
                series
                    .iter()
                    .filter(|s| s.time >= cutoff)
                    .max_by_key(|s| s.time)
                    .copied()
            }))
    }

    async fn past_within(
        &self,
        device_id: &UniqueId,
        measurement_id: &UniqueId,
        max_age: Duration,
    ) -> StoreResult<Vec<Sample>> {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(max_age).unwrap_or_else(|_| chrono::Duration::zero());
        let mut samples: Vec<Sample> = self
            .samples
            .get(&(device_id.to_string(), measurement_id.to_string()))
            .map(|series| series.iter().filter(|s| s.time >= cutoff).copied().collect())
            .unwrap_or_default();
        samples.sort_by_key(|s| s.time);
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(function_id: &UniqueId, position: u32) -> ActionConfig {
        ActionConfig {
            unique_id: UniqueId::new(),
            function_id: function_id.clone(),
            action_type: "pause".into(),
            options: serde_json::Map::new(),
            position,
        }
    }

    #[tokio::test]
    async fn test_actions_for_function_ordered() {
        let store = MemoryStore::new();
        let function_id = UniqueId::new();

        store.insert_action(action(&function_id, 2));
        store.insert_action(action(&function_id, 0));
        store.insert_action(action(&function_id, 1));
        store.insert_action(action(&UniqueId::new(), 0)); // other function

        let actions = store.actions_for_function(&function_id).await.unwrap();
        assert_eq!(actions.len(), 3);
        assert_eq!(
            actions.iter().map(|a| a.position).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[tokio::test]
    async fn test_missing_record_is_none() {
        let store = MemoryStore::new();
        assert!(store.input(&UniqueId::new()).await.unwrap().is_none());
        assert!(store.note_tag(&UniqueId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sample_window() {
        let store = MemoryStore::new();
        let device = UniqueId::new();
        let measurement = UniqueId::new();
        let now = Utc::now();

        store.add_sample(
            &device,
            &measurement,
            Sample::new(now - chrono::Duration::seconds(10), 1.0),
        );
        store.add_sample(
            &device,
            &measurement,
            Sample::new(now - chrono::Duration::seconds(3600), 2.0),
        );

        let last = store
            .last_within(&device, &measurement, Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(last.map(|s| s.value), Some(1.0));

        let past = store
            .past_within(&device, &measurement, Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(past.len(), 1);

        let all = store
            .past_within(&device, &measurement, Duration::from_secs(7200))
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        // Oldest first
        assert_eq!(all[0].value, 2.0);
    }

    #[tokio::test]
    async fn test_smtp_config_missing() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.smtp_config().await,
            Err(StoreError::NoSmtpConfig)
        ));
    }

    #[tokio::test]
    async fn test_gate_state_roundtrip() {
        let store = MemoryStore::new();
        let state = SmtpGateState {
            email_count: 4,
            window_reset_at: Utc::now(),
        };
        store.save_smtp_gate_state(state).await.unwrap();
        assert_eq!(store.smtp_gate_state().await.unwrap().email_count, 4);
    }
}
