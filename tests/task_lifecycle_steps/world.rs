//! Shared world state for task lifecycle BDD scenarios.

use std::sync::Arc;

use super::clock::ScenarioClock;
use rstest::fixture;
use taskloom::{
    config::StateManagerConfig,
    state::{error::StateUpdateResult, services::StateManager},
};

/// Manager type used by the BDD world.
pub type TestStateManager = StateManager<ScenarioClock>;

/// Scenario world for lifecycle behaviour tests.
pub struct LifecycleWorld {
    pub clock: Arc<ScenarioClock>,
    pub manager: TestStateManager,
    pub last_result: Option<StateUpdateResult<()>>,
}

impl LifecycleWorld {
    /// Creates a world around a fresh conversation state.
    #[must_use]
    pub fn new() -> Self {
        let clock = Arc::new(ScenarioClock::default());
        Self {
            manager: StateManager::new(Arc::clone(&clock), StateManagerConfig::default()),
            clock,
            last_result: None,
        }
    }

    /// Stores the outcome of the latest mutator call.
    pub fn record<T>(&mut self, result: StateUpdateResult<T>) {
        self.last_result = Some(result.map(|_| ()));
    }
}

impl Default for LifecycleWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> LifecycleWorld {
    LifecycleWorld::default()
}
