//! Stateless checks applied before the state manager mutates anything.
//!
//! The `validate_*` predicates answer yes/no. The `ensure_*` variants wrap the
//! same checks and return the specific error the manager reports.

use super::{
    domain::{AgentStateRecord, Message, TaskStatus},
    error::{StateTransitionError, ValidationError},
};
use std::iter;

/// Returns `true` when the status table permits `current -> next`.
#[must_use]
pub const fn validate_task_transition(current: TaskStatus, next: TaskStatus) -> bool {
    current.can_transition_to(next)
}

/// Returns `true` when creation timestamps never decrease.
///
/// An empty or single-message sequence is trivially ordered.
///
/// ```
/// use taskloom::state::validation::validate_message_sequence;
///
/// assert!(validate_message_sequence(&[]));
/// ```
#[must_use]
pub fn validate_message_sequence(messages: &[Message]) -> bool {
    messages
        .windows(2)
        .all(|pair| matches!(pair, [earlier, later] if earlier.created_at() <= later.created_at()))
}

/// Returns `true` when `record` carries a `status` key.
///
/// The agent identifier is not checked against any roster.
#[must_use]
pub fn validate_agent_state(_agent_id: &str, record: &AgentStateRecord) -> bool {
    record.has_status()
}

/// Checks a status transition.
///
/// # Errors
///
/// Returns [`StateTransitionError::Illegal`] when the table forbids it.
pub const fn ensure_task_transition(
    current: TaskStatus,
    next: TaskStatus,
) -> Result<(), StateTransitionError> {
    if validate_task_transition(current, next) {
        Ok(())
    } else {
        Err(StateTransitionError::Illegal {
            from: current,
            to: next,
        })
    }
}

/// Checks that creation timestamps never decrease across `messages`.
///
/// # Errors
///
/// Returns [`ValidationError::OutOfOrderMessage`] for the first pair whose
/// timestamps decrease.
pub fn ensure_message_sequence(messages: &[Message]) -> Result<(), ValidationError> {
    first_decrease(messages.iter())
}

/// Checks the sequence that appending `candidate` to `history` would produce.
///
/// # Errors
///
/// Returns [`ValidationError::OutOfOrderMessage`] for the first pair whose
/// timestamps decrease.
pub fn ensure_appendable(history: &[Message], candidate: &Message) -> Result<(), ValidationError> {
    first_decrease(history.iter().chain(iter::once(candidate)))
}

fn first_decrease<'a, I>(messages: I) -> Result<(), ValidationError>
where
    I: Iterator<Item = &'a Message> + Clone,
{
    let mut pairs = messages.clone().zip(messages.skip(1));
    pairs
        .find(|(earlier, later)| earlier.created_at() > later.created_at())
        .map_or(Ok(()), |(earlier, later)| {
            Err(ValidationError::OutOfOrderMessage {
                previous: earlier.created_at(),
                candidate: later.created_at(),
            })
        })
}

/// Checks the shape of an agent record.
///
/// # Errors
///
/// Returns [`ValidationError::MissingAgentStatus`] when the `status` key is
/// absent.
pub fn ensure_agent_state(agent_id: &str, record: &AgentStateRecord) -> Result<(), ValidationError> {
    if validate_agent_state(agent_id, record) {
        Ok(())
    } else {
        Err(ValidationError::MissingAgentStatus {
            agent_id: agent_id.to_owned(),
        })
    }
}
