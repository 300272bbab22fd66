//! Application services that own and mutate aggregate state.

mod manager;
mod rate_guard;

pub use manager::{ErrorStats, StateManager};
pub use rate_guard::RateGuard;
