//! Ordered execution of a Function's action chain

use crate::gate::NotificationGate;
use crate::EngineResult;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};
use vd_actions::{ActionError, ActionExecutor, ActionOutput, ActionVars};
use vd_control::Mailer;
use vd_core::{action_not_found_suffix, ActionConfig, Attachment, NoteRecord, UniqueId};
use vd_store::Store;

/// Action kinds excluded from bulk chain execution. They stay invokable
/// through [`ChainRunner::run_single`].
pub const SKIP_IN_CHAIN: &[&str] = &["publish_message"];

/// Per-run accumulator threaded through the chain.
///
/// Each action's output is merged in: the message is replaced by the
/// action's updated message, tags and recipients are appended in arrival
/// order (duplicates preserved), and a new attachment replaces any
/// earlier one — the last capture in the chain wins.
#[derive(Debug, Clone)]
pub struct ChainContext {
    pub message: String,
    pub note_tags: Vec<UniqueId>,
    pub email_recipients: Vec<String>,
    pub attachment: Option<Attachment>,
}

impl ChainContext {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            note_tags: Vec::new(),
            email_recipients: Vec::new(),
            attachment: None,
        }
    }

    fn merge(&mut self, output: ActionOutput) {
        self.message = output.message;
        self.note_tags.extend(output.note_tags);
        self.email_recipients.extend(output.email_recipients);
        if output.attachment.is_some() {
            self.attachment = output.attachment;
        }
    }
}

/// Runs the ordered action chain of a Function and performs the
/// end-of-chain aggregates: at most one gated email send and at most one
/// note, regardless of how many actions fed them.
///
/// A single failing action never aborts the chain; the failure becomes a
/// message suffix and the next action runs. The gate must be the shared
/// process-wide instance so concurrent chains contend on one counter.
pub struct ChainRunner {
    store: Arc<dyn Store>,
    executor: ActionExecutor,
    gate: Arc<NotificationGate>,
    mailer: Arc<dyn Mailer>,
}

impl ChainRunner {
    pub fn new(
        store: Arc<dyn Store>,
        executor: ActionExecutor,
        gate: Arc<NotificationGate>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            store,
            executor,
            gate,
            mailer,
        }
    }

    /// Run every action attached to the Function, in position order,
    /// then the aggregate email and note steps. Returns the final
    /// accumulated message.
    #[instrument(skip(self, initial_message), fields(function = %function_id.short()))]
    pub async fn run_all(
        &self,
        function_id: &UniqueId,
        initial_message: &str,
    ) -> EngineResult<String> {
        let actions = self.store.actions_for_function(function_id).await?;
        debug!(actions = actions.len(), "Running action chain");

        let mut ctx = ChainContext::new(initial_message);
        for config in &actions {
            if SKIP_IN_CHAIN.contains(&config.action_type.as_str()) {
                debug!(
                    action = %config.unique_id.short(),
                    kind = %config.action_type,
                    "Action kind excluded from chain execution, skipping"
                );
                continue;
            }
            self.run_one(&mut ctx, config, &ActionVars::none()).await;
        }

        self.send_aggregate_email(&ctx).await;
        self.create_aggregate_note(&ctx).await;

        Ok(ctx.message)
    }

    /// Execute one action by id, outside any chain.
    ///
    /// The same executor contract applies (including the skip-listed
    /// kinds, which run here), but no aggregate steps. The caller gets
    /// the message plus all accumulator fields for optional continuation.
    pub async fn run_single(
        &self,
        action_id: &UniqueId,
        message: &str,
        value: Option<Value>,
    ) -> EngineResult<ChainContext> {
        let mut ctx = ChainContext::new(message);

        let config = match self.store.action(action_id).await? {
            Some(config) => config,
            None => {
                error!(action = %action_id, "Action not found");
                ctx.message = format!("{} {}", message, action_not_found_suffix(action_id));
                return Ok(ctx);
            }
        };

        let vars = value.map(ActionVars::with_value).unwrap_or_default();
        self.run_one(&mut ctx, &config, &vars).await;
        Ok(ctx)
    }

    async fn run_one(&self, ctx: &mut ChainContext, config: &ActionConfig, vars: &ActionVars) {
        match self
            .executor
            .execute(&config.action_type, config, &ctx.message, vars)
            .await
        {
            Ok(output) => {
                ctx.merge(output);
                let name = self
                    .executor
                    .display_name(&config.action_type)
                    .map(str::to_string)
                    .unwrap_or_else(|| config.action_type.clone());
                ctx.message.push_str(&format!(
                    "\n[Action {}, {}]:",
                    config.unique_id.short(),
                    name
                ));
            }
            Err(ActionError::UnknownAction(_)) | Err(ActionError::PluginLoad(_)) => {
                error!(
                    action = %config.unique_id.short(),
                    kind = %config.action_type,
                    "Action plugin could not be resolved"
                );
                ctx.message.push_str(&format!(
                    " {}",
                    action_not_found_suffix(&config.unique_id)
                ));
            }
            Err(e) => {
                error!(
                    action = %config.unique_id.short(),
                    kind = %config.action_type,
                    error = %e,
                    "Action failed"
                );
                ctx.message
                    .push_str(&format!(" Error running action: {}.", e));
            }
        }
    }

    /// One email to every accumulated recipient, subject to the gate.
    /// Aggregate failures are logged, never propagated: the chain has
    /// already run and its message must still reach the caller.
    async fn send_aggregate_email(&self, ctx: &ChainContext) {
        if ctx.email_recipients.is_empty() {
            return;
        }

        let (resets_at, allowed) = match self.gate.check_and_count().await {
            Ok(verdict) => verdict,
            Err(e) => {
                error!(error = %e, "Notification gate check failed, dropping email");
                return;
            }
        };

        if !allowed {
            let wait_sec = (resets_at - Utc::now()).num_seconds().max(0);
            error!(
                recipients = ctx.email_recipients.len(),
                wait_sec, "Email rate limit reached, dropping send"
            );
            return;
        }

        let config = match self.store.smtp_config().await {
            Ok(config) => config,
            Err(e) => {
                error!(error = %e, "No usable SMTP configuration, dropping email");
                return;
            }
        };

        if let Err(e) = self
            .mailer
            .send(
                &config,
                &ctx.email_recipients,
                &ctx.message,
                ctx.attachment.as_ref(),
            )
            .await
        {
            error!(error = %e, "Email send failed");
        }
    }

    /// One note tagged with every accumulated tag that still exists.
    /// Tags whose records were deleted since the action ran are dropped
    /// silently; no note is created when none survive.
    async fn create_aggregate_note(&self, ctx: &ChainContext) {
        if ctx.note_tags.is_empty() {
            return;
        }

        let mut valid = Vec::new();
        for tag in &ctx.note_tags {
            match self.store.note_tag(tag).await {
                Ok(Some(_)) => valid.push(tag.clone()),
                Ok(None) => warn!(tag = %tag.short(), "Note tag no longer exists, dropping"),
                Err(e) => {
                    error!(tag = %tag.short(), error = %e, "Note tag lookup failed, dropping")
                }
            }
        }

        if valid.is_empty() {
            warn!("No valid note tags remain, skipping note");
            return;
        }

        let note = NoteRecord {
            unique_id: UniqueId::new(),
            name: "Action".to_string(),
            tags: valid,
            note: ctx.message.clone(),
            created_at: Utc::now(),
        };
        if let Err(e) = self.store.add_note(note).await {
            error!(error = %e, "Note creation failed");
        }
    }
}
