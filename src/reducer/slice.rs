use crate::action::Action;
use crate::error::{Result, StoreError};
use crate::reducer::SliceReducer;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

type CaseReducer<T> = Box<dyn Fn(&mut T, &Action) + Send + Sync>;

/// A slice of root state with a concrete type and per-action case reducers.
///
/// Case reducers mutate a decoded copy of the slice state in place; the
/// result is encoded back into the root state. Action types are namespaced by
/// the slice name, so the `increment` case of slice `counter` handles
/// `counter/increment`.
///
/// # Examples
///
/// ```
/// use stowage::{configure_store, Slice, StoreConfig};
///
/// let counter = Slice::new("counter", 0i64)
///     .case("increment", |count, _| *count += 1)
///     .case("add", |count, action| {
///         *count += action.payload().and_then(|p| p.as_i64()).unwrap_or(0);
///     });
/// let actions = counter.actions();
///
/// let store = configure_store(StoreConfig::new().slice(counter)).unwrap();
/// store.dispatch(actions.action("increment")).unwrap();
/// store.dispatch(actions.action_with("add", 41.into())).unwrap();
///
/// assert_eq!(store.get_state().slice::<i64>("counter").unwrap(), Some(42));
/// ```
pub struct Slice<T> {
    name: String,
    initial: T,
    cases: Vec<(String, CaseReducer<T>)>,
}

impl<T> Slice<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>, initial: T) -> Self {
        Self {
            name: name.into(),
            initial,
            cases: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle `"{name}/{kind}"` actions.
    pub fn case<F>(self, kind: &str, reducer: F) -> Self
    where
        F: Fn(&mut T, &Action) + Send + Sync + 'static,
    {
        let action_type = self.actions().action_type(kind);
        self.extra_case(action_type, reducer)
    }

    /// Handle an action type that belongs to some other part of the
    /// application.
    ///
    /// Several cases may match the same type; they run in registration order.
    pub fn extra_case<F>(mut self, action_type: impl Into<String>, reducer: F) -> Self
    where
        F: Fn(&mut T, &Action) + Send + Sync + 'static,
    {
        self.cases.push((action_type.into(), Box::new(reducer)));
        self
    }

    /// Action creators for this slice.
    pub fn actions(&self) -> SliceActions {
        SliceActions {
            name: self.name.clone(),
        }
    }

    fn decode(&self, value: &Value) -> Result<T> {
        T::deserialize(value).map_err(|source| StoreError::SliceDecode {
            slice: self.name.clone(),
            source,
        })
    }

    fn encode(&self, state: &T) -> Result<Value> {
        serde_json::to_value(state).map_err(|source| StoreError::SliceEncode {
            slice: self.name.clone(),
            source,
        })
    }
}

impl<T> SliceReducer for Slice<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn reduce(&self, state: Option<&Value>, action: &Action) -> Result<Option<Value>> {
        let mut matching = self
            .cases
            .iter()
            .filter(|(action_type, _)| action_type == action.kind())
            .peekable();

        if matching.peek().is_none() {
            return match state {
                Some(value) => Ok(Some(value.clone())),
                None => self.encode(&self.initial).map(Some),
            };
        }

        let mut current = match state {
            Some(value) => self.decode(value)?,
            None => self.initial.clone(),
        };
        for (_, reducer) in matching {
            reducer(&mut current, action);
        }
        self.encode(&current).map(Some)
    }
}

/// Creates actions namespaced by a slice name.
#[derive(Clone, Debug)]
pub struct SliceActions {
    name: String,
}

impl SliceActions {
    pub fn action_type(&self, kind: &str) -> String {
        format!("{}/{}", self.name, kind)
    }

    pub fn action(&self, kind: &str) -> Action {
        Action::new(self.action_type(kind))
    }

    pub fn action_with(&self, kind: &str, payload: Value) -> Action {
        self.action(kind).with_payload(payload)
    }
}
