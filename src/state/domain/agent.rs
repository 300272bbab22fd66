//! Per-agent status records.
//!
//! The agent roster is open-ended, so a record stays a JSON object. The only
//! structural rule is the presence of a `status` key, enforced when a record
//! is submitted to the state manager.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key every submitted agent record must carry.
pub const STATUS_KEY: &str = "status";

/// Opaque state reported by one agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentStateRecord(Map<String, Value>);

impl AgentStateRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a record holding only a status.
    ///
    /// ```
    /// use taskloom::state::domain::AgentStateRecord;
    ///
    /// let record = AgentStateRecord::with_status("running");
    /// assert_eq!(record.status(), Some("running"));
    /// ```
    #[must_use]
    pub fn with_status(status: impl Into<String>) -> Self {
        Self::new().with_field(STATUS_KEY, Value::String(status.into()))
    }

    /// Adds or replaces a field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns the status as text when it is a JSON string.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.0.get(STATUS_KEY).and_then(Value::as_str)
    }

    /// Returns `true` when the record carries a `status` key of any type.
    #[must_use]
    pub fn has_status(&self) -> bool {
        self.0.contains_key(STATUS_KEY)
    }

    /// Returns a field by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns `true` when no fields are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Shallow-merges `other` into this record; incoming keys win.
    pub fn merge(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// Returns the underlying map.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for AgentStateRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
