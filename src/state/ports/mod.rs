//! Port contracts for state collaborators.

mod checkpoint;

pub use checkpoint::{CheckpointError, CheckpointResult, StateCheckpointStore};
