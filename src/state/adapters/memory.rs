//! In-memory checkpoint store.
//!
//! Snapshots are kept as JSON values rather than live structs so a save/load
//! cycle exercises the same serialized shape an external store would see.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::state::{
    domain::{AggregateState, ConversationId},
    ports::{CheckpointError, CheckpointResult, StateCheckpointStore},
};

/// Thread-safe in-memory checkpoint store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCheckpointStore {
    snapshots: Arc<RwLock<HashMap<ConversationId, Value>>>,
}

impl InMemoryCheckpointStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw JSON snapshot for a conversation.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::Persistence`] if the lock is poisoned.
    pub fn raw_snapshot(&self, conversation_id: ConversationId) -> CheckpointResult<Option<Value>> {
        let snapshots = self.snapshots.read().map_err(|err| {
            CheckpointError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(snapshots.get(&conversation_id).cloned())
    }
}

#[async_trait]
impl StateCheckpointStore for InMemoryCheckpointStore {
    async fn save(&self, state: &AggregateState) -> CheckpointResult<()> {
        let snapshot = state
            .to_json()
            .map_err(|err| CheckpointError::serialization(&err))?;
        let mut snapshots = self.snapshots.write().map_err(|err| {
            CheckpointError::persistence(std::io::Error::other(err.to_string()))
        })?;
        snapshots.insert(state.conversation_state().conversation_id(), snapshot);
        Ok(())
    }

    async fn load(
        &self,
        conversation_id: ConversationId,
    ) -> CheckpointResult<Option<AggregateState>> {
        self.raw_snapshot(conversation_id)?
            .map(|snapshot| {
                AggregateState::from_json(snapshot)
                    .map_err(|err| CheckpointError::serialization(&err))
            })
            .transpose()
    }

    async fn remove(&self, conversation_id: ConversationId) -> CheckpointResult<bool> {
        let mut snapshots = self.snapshots.write().map_err(|err| {
            CheckpointError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(snapshots.remove(&conversation_id).is_some())
    }
}
