//! Error taxonomy for the orchestration state core.
//!
//! Domain checks raise the specific kinds ([`ValidationError`],
//! [`StateTransitionError`], [`RateLimitError`]), which are collected under the
//! root [`StateError`]. The [`StateManager`](crate::state::services::StateManager)
//! returns every failure as a [`StateUpdateError`] carrying the root cause.

use super::domain::TaskStatus;
use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

/// A proposed value failed a structural check.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Message content is empty or whitespace-only.
    #[error("message content cannot be empty")]
    EmptyContent,

    /// Appending the message would break timestamp ordering.
    #[error("message created at {candidate} precedes the previous message at {previous}")]
    OutOfOrderMessage {
        /// Timestamp of the last stored message.
        previous: DateTime<Utc>,
        /// Timestamp of the rejected candidate.
        candidate: DateTime<Utc>,
    },

    /// An agent state record has no `status` key.
    #[error("state record for agent '{agent_id}' must contain a status key")]
    MissingAgentStatus {
        /// The agent whose record was rejected.
        agent_id: String,
    },
}

/// A restored [`AggregateState`](super::domain::AggregateState) breaks a
/// structural invariant.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SnapshotError {
    /// The mirrored message log differs from the conversation log.
    #[error(
        "mirrored message log ({mirrored} messages) diverges from the conversation log \
         ({conversation} messages)"
    )]
    DivergedMessageLogs {
        /// Length of the top-level log.
        mirrored: usize,
        /// Length of the conversation log.
        conversation: usize,
    },

    /// The conversation log is not ordered by creation time.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An active task is recorded while not in progress, or the reverse.
    #[error("task status {status} contradicts active task presence ({has_active_task})")]
    ActiveTaskMismatch {
        /// The stored status.
        status: TaskStatus,
        /// Whether a current task description is stored.
        has_active_task: bool,
    },
}

/// A task lifecycle change is not permitted.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum StateTransitionError {
    /// The transition is absent from the status table.
    #[error("illegal task status transition from {from} to {to}")]
    Illegal {
        /// Status before the attempted change.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },

    /// A task-finishing operation was invoked while no task is active.
    #[error("no active task to move to {attempted}")]
    NoActiveTask {
        /// Status the caller tried to reach.
        attempted: TaskStatus,
    },
}

/// The flood guard rejected a call.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("rate limit exceeded: {consecutive} consecutive updates under {min_interval_ms} ms apart")]
pub struct RateLimitError {
    /// Length of the burst that tripped the guard.
    pub consecutive: u32,
    /// Spacing below which calls count towards a burst.
    pub min_interval_ms: i64,
}

/// Root of the state error hierarchy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StateError {
    /// Structural validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Lifecycle transition was rejected.
    #[error(transparent)]
    Transition(#[from] StateTransitionError),

    /// The rate guard tripped.
    #[error(transparent)]
    RateLimit(#[from] RateLimitError),
}

impl StateError {
    /// Returns `true` for structural validation failures.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns `true` for rejected lifecycle transitions.
    #[must_use]
    pub const fn is_transition(&self) -> bool {
        matches!(self, Self::Transition(_))
    }

    /// Returns `true` when the rate guard rejected the call.
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimit(_))
    }
}

/// The mutating operation that produced a [`StateUpdateError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateOperation {
    /// `update_conversation`.
    UpdateConversation,
    /// `update_agent_state`.
    UpdateAgentState,
    /// `set_task`.
    SetTask,
    /// `complete_task`.
    CompleteTask,
    /// `fail_task`.
    FailTask,
    /// `retry_task`.
    RetryTask,
    /// `set_final_result`.
    SetFinalResult,
}

impl StateOperation {
    /// Returns the operation name used in logs and summaries.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UpdateConversation => "update_conversation",
            Self::UpdateAgentState => "update_agent_state",
            Self::SetTask => "set_task",
            Self::CompleteTask => "complete_task",
            Self::FailTask => "fail_task",
            Self::RetryTask => "retry_task",
            Self::SetFinalResult => "set_final_result",
        }
    }
}

impl fmt::Display for StateOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform failure returned by every state manager mutator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{summary}")]
pub struct StateUpdateError {
    operation: StateOperation,
    summary: String,
    #[source]
    cause: StateError,
}

impl StateUpdateError {
    /// Wraps a root cause raised while running `operation`.
    #[must_use]
    pub fn new(operation: StateOperation, cause: impl Into<StateError>) -> Self {
        let root: StateError = cause.into();
        Self {
            summary: format!("{operation} failed: {root}"),
            operation,
            cause: root,
        }
    }

    /// Returns the failed operation.
    #[must_use]
    pub const fn operation(&self) -> StateOperation {
        self.operation
    }

    /// Returns the human-readable summary.
    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Returns the underlying cause.
    #[must_use]
    pub const fn cause(&self) -> &StateError {
        &self.cause
    }

    /// Consumes the wrapper and returns the cause.
    #[must_use]
    pub fn into_cause(self) -> StateError {
        self.cause
    }

    /// Returns `true` when the rate guard rejected the call.
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        self.cause.is_rate_limited()
    }
}

/// Result type for state manager mutators.
pub type StateUpdateResult<T> = Result<T, StateUpdateError>;
