//! Rolling-window rate limiter guarding outbound email

use crate::EngineResult;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;
use vd_store::Store;

/// Gate guarding the aggregate email send at the end of a chain run.
///
/// Counters are persisted through the store and shared process-wide;
/// concurrent chain runs contend on them, so the read-modify-write cycle
/// is serialized through an internal mutex. One gate instance must be
/// shared by every chain runner in the process.
///
/// The counter is incremented on every check, allowed or refused. That
/// reproduces the established behavior callers and tests depend on; see
/// DESIGN.md before changing it.
pub struct NotificationGate {
    store: Arc<dyn Store>,
    lock: Mutex<()>,
}

impl NotificationGate {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// Check whether a send is currently allowed, counting this check
    /// against the window either way.
    ///
    /// Returns the window reset instant as read at the start of the
    /// check (the caller logs it as the remaining wait on refusal) and
    /// the verdict. A refused send is dropped by the caller, not queued.
    pub async fn check_and_count(&self) -> EngineResult<(DateTime<Utc>, bool)> {
        let _guard = self.lock.lock().await;

        let config = self.store.smtp_config().await?;
        let mut state = self.store.smtp_gate_state().await?;
        let now = Utc::now();
        let resets_at = state.window_reset_at;

        let allowed = if state.email_count >= config.hourly_max && now < state.window_reset_at {
            false
        } else {
            if now > state.window_reset_at {
                state.email_count = 0;
                state.window_reset_at = now + Duration::hours(1);
            }
            true
        };

        state.email_count += 1;
        self.store.save_smtp_gate_state(state).await?;

        debug!(
            count = state.email_count,
            allowed, "Notification gate checked"
        );
        Ok((resets_at, allowed))
    }
}
