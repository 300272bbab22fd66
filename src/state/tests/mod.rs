//! Unit tests for the state module.
//!
//! Tests are organised by component: domain types, validation predicates,
//! the state manager, property checks and checkpointing.
