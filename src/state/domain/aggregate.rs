//! The full per-conversation state record.

use super::{AgentStateRecord, ConversationState, Message, TaskStatus};
use crate::state::{error::SnapshotError, validation::ensure_message_sequence};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Timestamped audit entry written when a task starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskHistoryEntry {
    /// When the task was started.
    pub recorded_at: DateTime<Utc>,
    /// The task description.
    pub description: String,
}

impl fmt::Display for TaskHistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.recorded_at.to_rfc3339(), self.description)
    }
}

/// Payload recorded when a task finishes.
///
/// Serialized externally tagged: an error is the object `{"error": "..."}`
/// and a result is `{"result": <value>}`, so a result that itself carries an
/// `error` key keeps its meaning across a checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOutcome {
    /// The task failed with the description reported by the agent layer.
    Error(String),
    /// The task completed with a result.
    Result(Value),
}

impl TaskOutcome {
    /// Creates an error outcome.
    #[must_use]
    pub fn error(description: impl Into<String>) -> Self {
        Self::Error(description.into())
    }

    /// Returns `true` for error outcomes.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// All mutable state for one conversation.
///
/// Instances are mutated only through the
/// [`StateManager`](crate::state::services::StateManager); callers get
/// read-only access to the fields. The whole record serializes to a plain JSON
/// structure with RFC 3339 timestamps so an external checkpoint store can
/// snapshot and restore it. Deserializing checks that the two message logs
/// agree, that they are ordered, and that an active task is recorded exactly
/// while the status is `in_progress`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredAggregate")]
pub struct AggregateState {
    messages: Vec<Message>,
    conversation_state: ConversationState,
    agent_states: BTreeMap<String, AgentStateRecord>,
    current_task: Option<String>,
    task_history: Vec<TaskHistoryEntry>,
    agent_results: BTreeMap<String, TaskOutcome>,
    final_result: Option<Value>,
}

#[derive(Deserialize)]
struct StoredAggregate {
    messages: Vec<Message>,
    conversation_state: ConversationState,
    agent_states: BTreeMap<String, AgentStateRecord>,
    current_task: Option<String>,
    task_history: Vec<TaskHistoryEntry>,
    agent_results: BTreeMap<String, TaskOutcome>,
    final_result: Option<Value>,
}

impl TryFrom<StoredAggregate> for AggregateState {
    type Error = SnapshotError;

    fn try_from(stored: StoredAggregate) -> Result<Self, Self::Error> {
        let conversation = stored.conversation_state.messages();
        if stored.messages.as_slice() != conversation {
            return Err(SnapshotError::DivergedMessageLogs {
                mirrored: stored.messages.len(),
                conversation: conversation.len(),
            });
        }
        ensure_message_sequence(conversation)?;

        let status = stored.conversation_state.current_task_status();
        let has_active_task = stored.current_task.is_some();
        if has_active_task != (status == TaskStatus::InProgress) {
            return Err(SnapshotError::ActiveTaskMismatch {
                status,
                has_active_task,
            });
        }

        Ok(Self {
            messages: stored.messages,
            conversation_state: stored.conversation_state,
            agent_states: stored.agent_states,
            current_task: stored.current_task,
            task_history: stored.task_history,
            agent_results: stored.agent_results,
            final_result: stored.final_result,
        })
    }
}

impl AggregateState {
    /// Creates the all-empty initial state for a new conversation.
    ///
    /// ```
    /// use taskloom::state::domain::{AggregateState, TaskStatus};
    /// use mockable::DefaultClock;
    ///
    /// let state = AggregateState::create_initial_state(&DefaultClock);
    /// assert!(state.messages().is_empty());
    /// assert!(state.current_task().is_none());
    /// assert_eq!(
    ///     state.conversation_state().current_task_status(),
    ///     TaskStatus::Pending
    /// );
    /// ```
    #[must_use]
    pub fn create_initial_state(clock: &impl Clock) -> Self {
        Self {
            messages: Vec::new(),
            conversation_state: ConversationState::new(clock),
            agent_states: BTreeMap::new(),
            current_task: None,
            task_history: Vec::new(),
            agent_results: BTreeMap::new(),
            final_result: None,
        }
    }

    /// Returns the mirrored message log.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the conversation record.
    #[must_use]
    pub const fn conversation_state(&self) -> &ConversationState {
        &self.conversation_state
    }

    /// Returns all agent records keyed by agent identifier.
    #[must_use]
    pub const fn agent_states(&self) -> &BTreeMap<String, AgentStateRecord> {
        &self.agent_states
    }

    /// Returns the active task description, if any.
    #[must_use]
    pub fn current_task(&self) -> Option<&str> {
        self.current_task.as_deref()
    }

    /// Returns the task audit trail in start order.
    #[must_use]
    pub fn task_history(&self) -> &[TaskHistoryEntry] {
        &self.task_history
    }

    /// Returns recorded outcomes keyed by task description.
    #[must_use]
    pub const fn agent_results(&self) -> &BTreeMap<String, TaskOutcome> {
        &self.agent_results
    }

    /// Returns the final result set by the driver, if any.
    #[must_use]
    pub const fn final_result(&self) -> Option<&Value> {
        self.final_result.as_ref()
    }

    /// Serializes the state to a JSON value.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if a metadata value cannot be encoded.
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Restores a state from a JSON value produced by [`Self::to_json`].
    ///
    /// # Errors
    ///
    /// Returns the deserializer error when the value does not have the
    /// expected shape or breaks a [`SnapshotError`] invariant.
    pub fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub(crate) const fn conversation_state_mut(&mut self) -> &mut ConversationState {
        &mut self.conversation_state
    }

    pub(crate) fn mirror_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub(crate) fn merge_agent_state(&mut self, agent_id: &str, record: AgentStateRecord) {
        self.agent_states
            .entry(agent_id.to_owned())
            .or_default()
            .merge(record);
    }

    pub(crate) fn start_task(&mut self, description: String, recorded_at: DateTime<Utc>) {
        self.task_history.push(TaskHistoryEntry {
            recorded_at,
            description: description.clone(),
        });
        self.current_task = Some(description);
    }

    pub(crate) fn finish_task(&mut self, outcome: Option<TaskOutcome>) {
        if let Some(description) = self.current_task.take()
            && let Some(payload) = outcome
        {
            self.agent_results.insert(description, payload);
        }
    }

    pub(crate) fn set_final_result(&mut self, value: Value) {
        self.final_result = Some(value);
    }
}
