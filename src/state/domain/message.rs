//! A single validated conversation turn.

use super::{MessageId, Role};
use crate::state::error::ValidationError;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form message annotations keyed by unique names.
pub type Metadata = Map<String, Value>;

/// A message within a conversation.
///
/// # Invariants
///
/// - `content` is trimmed and never empty
/// - `metadata` is always present, possibly empty
/// - messages are not modified after construction
///
/// # Examples
///
/// ```
/// use taskloom::state::domain::{Message, Role};
/// use mockable::DefaultClock;
///
/// let message = Message::new(Role::User, "  Hello!  ", None, &DefaultClock)
///     .expect("valid message");
/// assert_eq!(message.content(), "Hello!");
/// assert!(message.metadata().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    role: Role,
    content: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    metadata: Metadata,
}

impl Message {
    /// Creates a message stamped with the clock's current time.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyContent`] if `content` is blank after
    /// trimming.
    pub fn new(
        role: Role,
        content: &str,
        metadata: Option<Metadata>,
        clock: &impl Clock,
    ) -> Result<Self, ValidationError> {
        Self::with_timestamp(role, content, metadata, clock.utc())
    }

    /// Creates a message with an explicit creation timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyContent`] if `content` is blank after
    /// trimming.
    pub fn with_timestamp(
        role: Role,
        content: &str,
        metadata: Option<Metadata>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyContent);
        }

        Ok(Self {
            id: MessageId::new(),
            role,
            content: trimmed.to_owned(),
            created_at,
            metadata: metadata.unwrap_or_default(),
        })
    }

    /// Returns the message identifier.
    #[must_use]
    pub const fn id(&self) -> MessageId {
        self.id
    }

    /// Returns the message role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the trimmed text content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the metadata map.
    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}
