//! Domain model for conversation and task orchestration state.
//!
//! These types carry no infrastructure dependencies. Everything here is
//! serialisable via serde so a driver can checkpoint an [`AggregateState`]
//! between steps.

mod agent;
mod aggregate;
mod conversation;
mod ids;
mod message;
mod role;
mod status;

pub use agent::{AgentStateRecord, STATUS_KEY};
pub use aggregate::{AggregateState, TaskHistoryEntry, TaskOutcome};
pub use conversation::ConversationState;
pub use ids::{ConversationId, MessageId};
pub use message::{Message, Metadata};
pub use role::{ParseRoleError, Role};
pub use status::{ParseTaskStatusError, TaskStatus};

/// Name used by orchestration graphs for the aggregate record.
pub type GraphState = AggregateState;
