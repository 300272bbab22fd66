//! Step definitions for task lifecycle scenarios.

pub mod clock;
mod given;
mod then;
mod when;
pub mod world;
