//! Runtime configuration for the state manager.
//!
//! Defaults reproduce the flood guard thresholds the orchestration driver has
//! always relied on. Deployments may override them through environment
//! variables.

use chrono::TimeDelta;
use std::env;
use thiserror::Error;

/// Environment variable overriding [`RateGuardConfig::min_interval`], in
/// milliseconds.
pub const MIN_INTERVAL_ENV: &str = "TASKLOOM_RATE_GUARD_MIN_INTERVAL_MS";

/// Environment variable overriding [`RateGuardConfig::max_burst`].
pub const MAX_BURST_ENV: &str = "TASKLOOM_RATE_GUARD_MAX_BURST";

/// Environment variable overriding [`StateManagerConfig::context_window`].
pub const CONTEXT_WINDOW_ENV: &str = "TASKLOOM_CONTEXT_WINDOW";

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set but could not be parsed.
    #[error("invalid value '{value}' for {key}: expected a non-negative integer")]
    InvalidValue {
        /// The offending variable.
        key: &'static str,
        /// The raw value.
        value: String,
    },
}

/// Thresholds for the consecutive-burst flood guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateGuardConfig {
    /// Calls spaced closer than this count towards a burst.
    pub min_interval: TimeDelta,
    /// A call is rejected once the burst counter exceeds this value.
    pub max_burst: u32,
}

impl Default for RateGuardConfig {
    fn default() -> Self {
        Self {
            min_interval: TimeDelta::milliseconds(100),
            max_burst: 100,
        }
    }
}

impl RateGuardConfig {
    /// A guard that never rejects.
    #[must_use]
    pub const fn unthrottled() -> Self {
        Self {
            min_interval: TimeDelta::zero(),
            max_burst: u32::MAX,
        }
    }
}

/// Configuration for a [`StateManager`](crate::state::services::StateManager).
///
/// # Examples
///
/// ```
/// use taskloom::config::StateManagerConfig;
///
/// let config = StateManagerConfig::default();
/// assert_eq!(config.rate_guard.max_burst, 100);
/// assert_eq!(config.context_window, 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateManagerConfig {
    /// Flood guard thresholds.
    pub rate_guard: RateGuardConfig,
    /// Window used by `default_context`.
    pub context_window: usize,
}

impl Default for StateManagerConfig {
    fn default() -> Self {
        Self {
            rate_guard: RateGuardConfig::default(),
            context_window: 10,
        }
    }
}

impl StateManagerConfig {
    /// Configuration with the flood guard disabled.
    ///
    /// Useful for replaying recorded conversations in bulk.
    #[must_use]
    pub fn unthrottled() -> Self {
        Self {
            rate_guard: RateGuardConfig::unthrottled(),
            ..Self::default()
        }
    }

    /// Reads overrides from the process environment on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a variable is set to
    /// something other than a non-negative integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads overrides through `lookup` on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a value is set to something
    /// other than a non-negative integer.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(millis) = parse_var::<u32>(&lookup, MIN_INTERVAL_ENV)? {
            config.rate_guard.min_interval = TimeDelta::milliseconds(i64::from(millis));
        }
        if let Some(max_burst) = parse_var::<u32>(&lookup, MAX_BURST_ENV)? {
            config.rate_guard.max_burst = max_burst;
        }
        if let Some(window) = parse_var::<usize>(&lookup, CONTEXT_WINDOW_ENV)? {
            config.context_window = window;
        }

        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidValue { key, value: raw })
}
