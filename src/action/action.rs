use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::{BuildHasher, Hasher};

/// Prefix shared by every action type the store dispatches on its own.
pub const RESERVED_PREFIX: &str = "@@stowage/";

/// Dispatched once when a store is configured so that every slice can
/// produce its initial state.
pub const INIT: &str = "@@stowage/INIT";

/// Dispatched after the reducer map of a store has been replaced.
pub const REPLACE: &str = "@@stowage/REPLACE";

/// A plain description of something that happened.
///
/// Actions carry a string type and an optional JSON payload. They serialize
/// as `{"type": "...", "payload": ...}`.
///
/// # Examples
///
/// ```
/// use stowage::Action;
/// use serde_json::json;
///
/// let action = Action::new("todos/add").with_payload(json!("Buy milk"));
/// assert_eq!(action.kind(), "todos/add");
/// assert_eq!(action.payload(), Some(&json!("Buy milk")));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload: Option<Value>,
}

impl Action {
    /// Create an action with no payload.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: None,
        }
    }

    /// Attach a payload.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// Whether this is one of the store's own actions.
    pub fn is_internal(&self) -> bool {
        self.kind.starts_with(RESERVED_PREFIX)
    }

    pub(crate) fn init() -> Self {
        Self::new(INIT)
    }

    pub(crate) fn replace() -> Self {
        Self::new(REPLACE)
    }

    /// An action type no reducer can know about.
    ///
    /// Used to check that slice reducers fall back to their current state for
    /// actions they do not handle.
    pub(crate) fn probe() -> Self {
        let mut hasher = RandomState::new().build_hasher();
        hasher.write_u8(0);
        Self::new(format!(
            "{}PROBE_UNKNOWN_ACTION_{:016x}",
            RESERVED_PREFIX,
            hasher.finish()
        ))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.kind)
    }
}

impl From<&str> for Action {
    fn from(kind: &str) -> Self {
        Action::new(kind)
    }
}

impl From<String> for Action {
    fn from(kind: String) -> Self {
        Action::new(kind)
    }
}
