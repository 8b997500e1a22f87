use crate::error::{Result, StoreError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The state of a store built from slice reducers.
///
/// A JSON object keyed by slice name, in the order the slices were
/// registered. With no slices it is the empty object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RootState(Map<String, Value>);

impl RootState {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw state of one slice.
    pub fn get(&self, slice: &str) -> Option<&Value> {
        self.0.get(slice)
    }

    /// State of one slice decoded into `T`.
    ///
    /// Returns `Ok(None)` when no such slice exists.
    pub fn slice<T: DeserializeOwned>(&self, slice: &str) -> Result<Option<T>> {
        self.0
            .get(slice)
            .map(|value| {
                T::deserialize(value).map_err(|source| StoreError::SliceDecode {
                    slice: slice.to_string(),
                    source,
                })
            })
            .transpose()
    }

    /// Slice names in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub(crate) fn insert(&mut self, slice: String, value: Value) {
        self.0.insert(slice, value);
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl TryFrom<Value> for RootState {
    type Error = StoreError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(StoreError::InvalidPreloadedState(format!(
                "expected a JSON object, found {}",
                kind_of(&other)
            ))),
        }
    }
}

impl From<Map<String, Value>> for RootState {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
