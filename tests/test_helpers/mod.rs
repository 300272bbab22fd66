//! Scoped control over the `TASKLOOM_*` configuration variables.

use std::env;
use std::sync::{Mutex, MutexGuard, PoisonError};

use taskloom::config::{CONTEXT_WINDOW_ENV, MAX_BURST_ENV, MIN_INTERVAL_ENV};

static CONFIG_ENV: Mutex<()> = Mutex::new(());

const CONFIG_KEYS: [&str; 3] = [MIN_INTERVAL_ENV, MAX_BURST_ENV, CONTEXT_WINDOW_ENV];

/// Raw values for the configuration variables. `None` unsets the variable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigVars<'a> {
    pub min_interval_ms: Option<&'a str>,
    pub max_burst: Option<&'a str>,
    pub context_window: Option<&'a str>,
}

impl ConfigVars<'_> {
    const fn values(&self) -> [Option<&str>; 3] {
        [self.min_interval_ms, self.max_burst, self.context_window]
    }
}

/// Holds the configuration variables at the given values until dropped,
/// then restores what the process had before.
pub struct ConfigEnvGuard {
    previous: Vec<(&'static str, Option<String>)>,
    _lock: MutexGuard<'static, ()>,
}

impl ConfigEnvGuard {
    /// Applies `vars` to all three configuration keys.
    pub fn apply(vars: ConfigVars<'_>) -> Self {
        let lock = CONFIG_ENV.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = CONFIG_KEYS
            .into_iter()
            .zip(vars.values())
            .map(|(key, value)| {
                let prior = env::var(key).ok();
                write_var(key, value);
                (key, prior)
            })
            .collect();

        Self {
            previous,
            _lock: lock,
        }
    }
}

impl Drop for ConfigEnvGuard {
    fn drop(&mut self) {
        for (key, value) in self.previous.drain(..) {
            write_var(key, value.as_deref());
        }
    }
}

fn write_var(key: &str, value: Option<&str>) {
    unsafe {
        // SAFETY: CONFIG_ENV serializes every mutation of these variables.
        match value {
            Some(raw) => env::set_var(key, raw),
            None => env::remove_var(key),
        }
    }
}
