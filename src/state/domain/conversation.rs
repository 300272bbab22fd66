//! Ordered message log for one conversation.

use super::{ConversationId, Message, Metadata, Role, TaskStatus};
use crate::state::error::ValidationError;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Message history plus the status of the conversation's current task.
///
/// Every mutation refreshes `last_updated`, including status changes that do
/// not touch the message log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    conversation_id: ConversationId,
    messages: Vec<Message>,
    last_updated: DateTime<Utc>,
    current_task_status: TaskStatus,
}

impl ConversationState {
    /// Creates an empty conversation with a fresh identifier.
    #[must_use]
    pub fn new(clock: &impl Clock) -> Self {
        Self {
            conversation_id: ConversationId::new(),
            messages: Vec::new(),
            last_updated: clock.utc(),
            current_task_status: TaskStatus::Pending,
        }
    }

    /// Returns the conversation identifier.
    #[must_use]
    pub const fn conversation_id(&self) -> ConversationId {
        self.conversation_id
    }

    /// Returns all messages in insertion order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the time of the latest mutation.
    #[must_use]
    pub const fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Returns the current task status.
    #[must_use]
    pub const fn current_task_status(&self) -> TaskStatus {
        self.current_task_status
    }

    /// Builds a message from its parts and appends it.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyContent`] if `content` is blank after
    /// trimming; the log is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use taskloom::state::domain::{ConversationState, Role};
    /// use mockable::DefaultClock;
    ///
    /// let clock = DefaultClock;
    /// let mut conversation = ConversationState::new(&clock);
    /// conversation.append(Role::User, "hi", None, &clock).expect("valid content");
    /// assert_eq!(conversation.messages().len(), 1);
    /// ```
    pub fn append(
        &mut self,
        role: Role,
        content: &str,
        metadata: Option<Metadata>,
        clock: &impl Clock,
    ) -> Result<Message, ValidationError> {
        let message = Message::new(role, content, metadata, clock)?;
        self.push(message.clone(), clock);
        Ok(message)
    }

    /// Appends an already validated message.
    pub fn push(&mut self, message: Message, clock: &impl Clock) {
        self.messages.push(message);
        self.touch(clock);
    }

    /// Returns the most recently appended message.
    #[must_use]
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Returns up to the last `size` messages in their original order.
    #[must_use]
    pub fn context_window(&self, size: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(size);
        self.messages.get(start..).unwrap_or_default()
    }

    /// Records a new task status.
    ///
    /// Legality is checked by the caller against the transition table.
    pub fn set_task_status(&mut self, status: TaskStatus, clock: &impl Clock) {
        self.current_task_status = status;
        self.touch(clock);
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.last_updated = clock.utc();
    }
}
