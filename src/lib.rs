//! Taskloom: shared state for multi-agent conversation orchestration.
//!
//! This crate tracks an ongoing multi-turn conversation, the lifecycle of the
//! task its agents are working on, per-agent sub-state and a task audit trail.
//! All writes go through a single façade that enforces ordering and
//! transition invariants and rejects update floods.
//!
//! # Architecture
//!
//! Taskloom follows hexagonal architecture principles:
//!
//! - **Domain**: Pure state types with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external collaborators
//! - **Adapters**: Concrete implementations of ports
//!
//! # Modules
//!
//! - [`state`]: Aggregate state, validation and the state manager
//! - [`config`]: Rate guard and context window configuration

pub mod config;
pub mod state;
