//! Consecutive-burst flood guard for state mutations.
//!
//! This is not a token bucket. Each call is compared with the previous
//! accepted call: a gap under `min_interval` extends the burst, any longer gap
//! resets it. Once the burst counter exceeds `max_burst` calls are rejected
//! until a long enough pause occurs.

use crate::{config::RateGuardConfig, state::error::RateLimitError};
use chrono::{DateTime, Utc};

/// Tracks call spacing for one state manager.
#[derive(Debug, Clone)]
pub struct RateGuard {
    config: RateGuardConfig,
    last_accepted: DateTime<Utc>,
    burst: u32,
}

impl RateGuard {
    /// Creates a guard whose spacing reference starts at `now`.
    #[must_use]
    pub const fn new(config: RateGuardConfig, now: DateTime<Utc>) -> Self {
        Self {
            config,
            last_accepted: now,
            burst: 0,
        }
    }

    /// Admits or rejects a call arriving at `now`.
    ///
    /// Rejected calls leave the spacing reference untouched.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError`] when the burst counter exceeds the
    /// configured maximum.
    pub fn check(&mut self, now: DateTime<Utc>) -> Result<(), RateLimitError> {
        let candidate = if now - self.last_accepted < self.config.min_interval {
            self.burst.saturating_add(1)
        } else {
            0
        };

        if candidate > self.config.max_burst {
            self.burst = candidate;
            return Err(RateLimitError {
                consecutive: candidate,
                min_interval_ms: self.config.min_interval.num_milliseconds(),
            });
        }

        self.burst = candidate;
        self.last_accepted = now;
        Ok(())
    }

    /// Returns the current burst length.
    #[must_use]
    pub const fn burst(&self) -> u32 {
        self.burst
    }
}
