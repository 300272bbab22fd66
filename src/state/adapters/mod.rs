//! Adapter implementations for state ports.

pub mod memory;

pub use memory::InMemoryCheckpointStore;
