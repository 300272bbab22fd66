//! Checkpoint port for snapshotting aggregate state between steps.

use crate::state::domain::{AggregateState, ConversationId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for checkpoint operations.
pub type CheckpointResult<T> = Result<T, CheckpointError>;

/// Snapshot store contract used by orchestration drivers.
///
/// The core never calls a store on its own; drivers decide when to
/// checkpoint.
#[async_trait]
pub trait StateCheckpointStore: Send + Sync {
    /// Saves a snapshot, replacing any earlier one for the same conversation.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError`] when the state cannot be encoded or
    /// persisted.
    async fn save(&self, state: &AggregateState) -> CheckpointResult<()>;

    /// Loads the latest snapshot for a conversation.
    ///
    /// Returns `None` when nothing has been saved.
    async fn load(&self, conversation_id: ConversationId)
    -> CheckpointResult<Option<AggregateState>>;

    /// Drops the snapshot for a conversation, returning whether one existed.
    async fn remove(&self, conversation_id: ConversationId) -> CheckpointResult<bool>;
}

/// Errors returned by checkpoint stores.
#[derive(Debug, Clone, Error)]
pub enum CheckpointError {
    /// The snapshot could not be encoded or decoded.
    #[error("snapshot serialization failed: {0}")]
    Serialization(String),

    /// Storage-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl CheckpointError {
    /// Wraps a serde failure.
    #[must_use]
    pub fn serialization(err: &serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }

    /// Wraps a storage failure.
    #[must_use]
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
