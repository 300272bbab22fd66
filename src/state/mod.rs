//! Conversation and task orchestration state.
//!
//! A driver holds one [`services::StateManager`] per conversation and reports
//! agent progress through it. The manager owns the
//! [`domain::AggregateState`], guards it against update storms, checks every
//! proposed change with the [`validation`] predicates and translates any
//! failure into an [`error::StateUpdateError`].
//!
//! - Domain types in [`domain`]
//! - Stateless checks in [`validation`]
//! - Error taxonomy in [`error`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - The mutation façade in [`services`]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod validation;

#[cfg(test)]
mod tests;
