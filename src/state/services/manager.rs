//! The single mutation façade over an [`AggregateState`].

use super::rate_guard::RateGuard;
use crate::{
    config::StateManagerConfig,
    state::{
        domain::{
            AgentStateRecord, AggregateState, ConversationId, Message, Metadata, Role,
            TaskOutcome, TaskStatus,
        },
        error::{
            StateError, StateOperation, StateTransitionError, StateUpdateError, StateUpdateResult,
        },
        ports::{CheckpointResult, StateCheckpointStore},
        validation::{ensure_agent_state, ensure_appendable, ensure_task_transition},
    },
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Counters exposed for introspection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ErrorStats {
    /// Mutator calls that failed for any reason, rate limiting included.
    pub error_count: u64,
    /// Mutator calls that were applied.
    pub update_count: u64,
}

/// Owns one conversation's [`AggregateState`] and is the only way to change
/// it.
///
/// Every mutator runs the rate guard, then its own checks, and only then
/// touches state, so a failed call never leaves a partial mutation behind.
/// Failures are counted and returned as [`StateUpdateError`].
///
/// Mutators take `&mut self`: a single flow of control writes to a given
/// aggregate. Drivers fanning in results from parallel agents serialise them
/// before they reach the manager.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use taskloom::config::StateManagerConfig;
/// use taskloom::state::{domain::TaskStatus, services::StateManager};
/// use mockable::DefaultClock;
/// use serde_json::json;
///
/// let mut manager = StateManager::new(Arc::new(DefaultClock), StateManagerConfig::default());
/// manager.set_task("send report").expect("pending task can start");
/// manager.complete_task(Some(json!("report sent"))).expect("running task can complete");
///
/// let state = manager.get_current_state();
/// assert_eq!(state.conversation_state().current_task_status(), TaskStatus::Completed);
/// assert!(state.current_task().is_none());
/// ```
#[derive(Debug)]
pub struct StateManager<C>
where
    C: Clock + Send + Sync,
{
    state: AggregateState,
    clock: Arc<C>,
    config: StateManagerConfig,
    guard: RateGuard,
    stats: ErrorStats,
}

impl<C> StateManager<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a manager over a fresh initial state.
    #[must_use]
    pub fn new(clock: Arc<C>, config: StateManagerConfig) -> Self {
        let state = AggregateState::create_initial_state(&*clock);
        Self::from_state(state, clock, config)
    }

    /// Resumes management of an existing state, e.g. one restored from a
    /// checkpoint. Counters start at zero.
    #[must_use]
    pub fn from_state(state: AggregateState, clock: Arc<C>, config: StateManagerConfig) -> Self {
        let guard = RateGuard::new(config.rate_guard, clock.utc());
        Self {
            state,
            clock,
            config,
            guard,
            stats: ErrorStats::default(),
        }
    }

    /// Loads a checkpoint and resumes management of it.
    ///
    /// Returns `Ok(None)` when the store holds nothing for the conversation.
    ///
    /// # Errors
    ///
    /// Returns the store's [`CheckpointError`](crate::state::ports::CheckpointError).
    pub async fn restore(
        store: &impl StateCheckpointStore,
        conversation_id: ConversationId,
        clock: Arc<C>,
        config: StateManagerConfig,
    ) -> CheckpointResult<Option<Self>> {
        let restored = store.load(conversation_id).await?;
        Ok(restored.map(|state| Self::from_state(state, clock, config)))
    }

    /// Hands the current state to a checkpoint store.
    ///
    /// # Errors
    ///
    /// Returns the store's [`CheckpointError`](crate::state::ports::CheckpointError).
    pub async fn checkpoint(&self, store: &impl StateCheckpointStore) -> CheckpointResult<()> {
        store.save(&self.state).await
    }

    /// Appends a message to the conversation.
    ///
    /// The candidate is stamped with the clock's current time and the
    /// resulting sequence is validated before anything is stored.
    ///
    /// # Errors
    ///
    /// Fails with a validation cause for blank content or a timestamp older
    /// than the latest stored message, or with a rate limit cause.
    pub fn update_conversation(
        &mut self,
        role: Role,
        content: &str,
        metadata: Option<Metadata>,
    ) -> StateUpdateResult<Message> {
        self.mutate(StateOperation::UpdateConversation, |state, clock, now| {
            let message = Message::with_timestamp(role, content, metadata, now)?;
            ensure_appendable(state.conversation_state().messages(), &message)?;

            state
                .conversation_state_mut()
                .push(message.clone(), clock);
            state.mirror_message(message.clone());
            Ok(message)
        })
    }

    /// Shallow-merges `record` into the stored record for `agent_id`.
    ///
    /// # Errors
    ///
    /// Fails with a validation cause when `record` has no `status` key, or
    /// with a rate limit cause.
    pub fn update_agent_state(
        &mut self,
        agent_id: &str,
        record: AgentStateRecord,
    ) -> StateUpdateResult<()> {
        self.mutate(StateOperation::UpdateAgentState, |state, _, _| {
            ensure_agent_state(agent_id, &record)?;
            state.merge_agent_state(agent_id, record);
            Ok(())
        })
    }

    /// Starts a task and records it in the history.
    ///
    /// # Errors
    ///
    /// Fails with [`StateTransitionError::Illegal`] unless the current status
    /// may move to `in_progress`, or with a rate limit cause.
    pub fn set_task(&mut self, description: impl Into<String>) -> StateUpdateResult<()> {
        self.mutate(StateOperation::SetTask, |state, clock, now| {
            let current = state.conversation_state().current_task_status();
            ensure_task_transition(current, TaskStatus::InProgress)?;

            state.start_task(description.into(), now);
            state
                .conversation_state_mut()
                .set_task_status(TaskStatus::InProgress, clock);
            Ok(())
        })
    }

    /// Completes the active task, recording `result` when given.
    ///
    /// # Errors
    ///
    /// Fails with [`StateTransitionError::NoActiveTask`] when idle, with
    /// [`StateTransitionError::Illegal`] when the status forbids completion,
    /// or with a rate limit cause.
    pub fn complete_task(&mut self, result: Option<Value>) -> StateUpdateResult<()> {
        self.mutate(StateOperation::CompleteTask, |state, clock, _| {
            finish_active_task(
                state,
                TaskStatus::Completed,
                result.map(TaskOutcome::Result),
                clock,
            )
        })
    }

    /// Fails the active task, recording `{"error": error}`.
    ///
    /// # Errors
    ///
    /// Fails with [`StateTransitionError::NoActiveTask`] when idle, with
    /// [`StateTransitionError::Illegal`] when the status forbids failure, or
    /// with a rate limit cause.
    pub fn fail_task(&mut self, error: impl Into<String>) -> StateUpdateResult<()> {
        self.mutate(StateOperation::FailTask, |state, clock, _| {
            finish_active_task(
                state,
                TaskStatus::Failed,
                Some(TaskOutcome::error(error)),
                clock,
            )
        })
    }

    /// Resets a failed task status to `pending` so `set_task` can run again.
    ///
    /// The failed task's history entry and error payload are kept.
    ///
    /// # Errors
    ///
    /// Fails with [`StateTransitionError::Illegal`] unless the status is
    /// `failed`, or with a rate limit cause.
    pub fn retry_task(&mut self) -> StateUpdateResult<()> {
        self.mutate(StateOperation::RetryTask, |state, clock, _| {
            let current = state.conversation_state().current_task_status();
            ensure_task_transition(current, TaskStatus::Pending)?;

            state
                .conversation_state_mut()
                .set_task_status(TaskStatus::Pending, clock);
            Ok(())
        })
    }

    /// Stores the driver's final result for the conversation.
    ///
    /// # Errors
    ///
    /// Fails only with a rate limit cause.
    pub fn set_final_result(&mut self, value: Value) -> StateUpdateResult<()> {
        self.mutate(StateOperation::SetFinalResult, |state, _, _| {
            state.set_final_result(value);
            Ok(())
        })
    }

    /// Returns the failure and update counters.
    #[must_use]
    pub const fn get_error_stats(&self) -> ErrorStats {
        self.stats
    }

    /// Returns the record for `agent_id`, or an empty record if unknown.
    #[must_use]
    pub fn get_agent_state(&self, agent_id: &str) -> AgentStateRecord {
        self.state
            .agent_states()
            .get(agent_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns up to the last `window_size` messages.
    #[must_use]
    pub fn get_conversation_context(&self, window_size: usize) -> &[Message] {
        self.state
            .conversation_state()
            .context_window(window_size)
    }

    /// Returns the context window sized by configuration.
    #[must_use]
    pub fn default_context(&self) -> &[Message] {
        self.get_conversation_context(self.config.context_window)
    }

    /// Returns the task history rendered as `"<timestamp>: <description>"`.
    #[must_use]
    pub fn get_task_history(&self) -> Vec<String> {
        self.state
            .task_history()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Returns the live aggregate.
    #[must_use]
    pub const fn get_current_state(&self) -> &AggregateState {
        &self.state
    }

    /// Returns the current task status.
    #[must_use]
    pub const fn task_status(&self) -> TaskStatus {
        self.state.conversation_state().current_task_status()
    }

    /// Consumes the manager and returns the aggregate.
    #[must_use]
    pub fn into_state(self) -> AggregateState {
        self.state
    }

    fn mutate<T, F>(&mut self, operation: StateOperation, body: F) -> StateUpdateResult<T>
    where
        F: FnOnce(&mut AggregateState, &C, DateTime<Utc>) -> Result<T, StateError>,
    {
        let now = self.clock.utc();
        let conversation_id = self.state.conversation_state().conversation_id();
        let outcome = self
            .guard
            .check(now)
            .map_err(StateError::from)
            .and_then(|()| body(&mut self.state, &*self.clock, now));

        match outcome {
            Ok(value) => {
                self.stats.update_count = self.stats.update_count.saturating_add(1);
                tracing::debug!(
                    conversation_id = %conversation_id,
                    operation = %operation,
                    status = %self.state.conversation_state().current_task_status(),
                    "state update applied"
                );
                Ok(value)
            }
            Err(cause) => {
                self.stats.error_count = self.stats.error_count.saturating_add(1);
                let error = StateUpdateError::new(operation, cause);
                tracing::warn!(
                    conversation_id = %conversation_id,
                    operation = %operation,
                    error_count = self.stats.error_count,
                    error = %error,
                    "state update rejected"
                );
                Err(error)
            }
        }
    }
}

fn finish_active_task(
    state: &mut AggregateState,
    target: TaskStatus,
    outcome: Option<TaskOutcome>,
    clock: &impl Clock,
) -> Result<(), StateError> {
    if state.current_task().is_none() {
        return Err(StateTransitionError::NoActiveTask { attempted: target }.into());
    }
    let current = state.conversation_state().current_task_status();
    ensure_task_transition(current, target)?;

    state.finish_task(outcome);
    state.conversation_state_mut().set_task_status(target, clock);
    Ok(())
}
