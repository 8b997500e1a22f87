use crate::action::{Action, REPLACE};
use crate::error::{Result, StoreError};
use crate::reducer::Reducer;
use crate::state::RootState;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Reduces the state of one slice of a [`RootState`].
///
/// `state` is `None` until the slice has produced a value. A slice must
/// always produce one: returning `Ok(None)` is reported as an error by the
/// combined reducer.
pub trait SliceReducer: Send + Sync {
    fn reduce(&self, state: Option<&Value>, action: &Action) -> Result<Option<Value>>;
}

impl<F> SliceReducer for F
where
    F: Fn(Option<&Value>, &Action) -> Option<Value> + Send + Sync,
{
    fn reduce(&self, state: Option<&Value>, action: &Action) -> Result<Option<Value>> {
        Ok(self(state, action))
    }
}

/// Slice reducers keyed by slice name, in registration order.
#[derive(Default)]
pub struct ReducerMap {
    slices: Vec<(String, Box<dyn SliceReducer>)>,
}

impl ReducerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a slice reducer under `name`.
    pub fn insert<R>(&mut self, name: impl Into<String>, reducer: R) -> Result<()>
    where
        R: SliceReducer + 'static,
    {
        self.insert_boxed(name.into(), Box::new(reducer))
    }

    pub(crate) fn insert_boxed(
        &mut self,
        name: String,
        reducer: Box<dyn SliceReducer>,
    ) -> Result<()> {
        if self.contains(&name) {
            return Err(StoreError::DuplicateSlice(name));
        }
        self.slices.push((name, reducer));
        Ok(())
    }

    /// Chaining form of [`insert`](Self::insert).
    pub fn with<R>(mut self, name: impl Into<String>, reducer: R) -> Result<Self>
    where
        R: SliceReducer + 'static,
    {
        self.insert(name, reducer)?;
        Ok(self)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slices.iter().any(|(existing, _)| existing == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slices.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

/// Turns a [`ReducerMap`] into a single reducer over [`RootState`].
///
/// Every action is handed to every slice. The next root state holds exactly
/// one entry per registered slice.
pub struct CombinedReducer {
    slices: Vec<(String, Box<dyn SliceReducer>)>,
    dev_checks: bool,
    // Unexpected state keys already reported.
    reported: Mutex<HashSet<String>>,
}

impl CombinedReducer {
    /// Combine `map`.
    ///
    /// With `dev_checks`, every slice is first asked for its initial state and
    /// then probed with an action type nobody handles. A slice that produces
    /// no state for either fails the whole combination.
    pub fn new(map: ReducerMap, dev_checks: bool) -> Result<Self> {
        if dev_checks {
            for (name, reducer) in &map.slices {
                assert_initial_state(name, reducer.as_ref())?;
            }
        }

        Ok(Self {
            slices: map.slices,
            dev_checks,
            reported: Mutex::new(HashSet::new()),
        })
    }

    pub fn slice_names(&self) -> impl Iterator<Item = &str> {
        self.slices.iter().map(|(name, _)| name.as_str())
    }

    fn report_unexpected_keys(&self, state: &RootState, action: &Action) {
        let mut reported = self.reported.lock().unwrap_or_else(PoisonError::into_inner);
        let unexpected: Vec<&str> = state
            .keys()
            .filter(|key| !self.slices.iter().any(|(name, _)| name == key))
            .filter(|key| !reported.contains(*key))
            .collect();

        for key in &unexpected {
            reported.insert((*key).to_string());
        }

        // Keys left over before a reducer replacement may belong to slices
        // that are about to be registered.
        if unexpected.is_empty() || action.kind() == REPLACE {
            return;
        }

        tracing::warn!(
            keys = ?unexpected,
            expected = ?self.slice_names().collect::<Vec<_>>(),
            "unexpected keys in state will be ignored"
        );
    }
}

impl Reducer<RootState, Action> for CombinedReducer {
    fn reduce(&self, state: &RootState, action: &Action) -> Result<RootState> {
        if self.dev_checks {
            self.report_unexpected_keys(state, action);
        }

        let mut next = RootState::new();
        for (name, reducer) in &self.slices {
            match reducer.reduce(state.get(name), action)? {
                Some(value) => next.insert(name.clone(), value),
                None => {
                    return Err(StoreError::UndefinedSliceState {
                        slice: name.clone(),
                        action: action.kind().to_string(),
                    })
                }
            }
        }
        Ok(next)
    }
}

fn assert_initial_state(name: &str, reducer: &dyn SliceReducer) -> Result<()> {
    if reducer.reduce(None, &Action::init())?.is_none() {
        return Err(StoreError::UndefinedInitialState {
            slice: name.to_string(),
        });
    }

    if reducer.reduce(None, &Action::probe())?.is_none() {
        return Err(StoreError::UndefinedProbeState {
            slice: name.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    fn counter(state: Option<&Value>, action: &Action) -> Option<Value> {
        let count = state.and_then(Value::as_i64).unwrap_or(0);
        match action.kind() {
            "counter/increment" => Some(json!(count + 1)),
            _ => Some(json!(count)),
        }
    }

    fn label(state: Option<&Value>, action: &Action) -> Option<Value> {
        match action.kind() {
            "label/set" => action.payload().cloned(),
            _ => Some(state.cloned().unwrap_or_else(|| json!(""))),
        }
    }

    fn init_only(state: Option<&Value>, action: &Action) -> Option<Value> {
        match (state, action.kind()) {
            (Some(value), _) => Some(value.clone()),
            (None, crate::action::INIT) => Some(json!(0)),
            (None, _) => None,
        }
    }

    #[test]
    fn empty_map_reduces_to_empty_object() {
        let reducer = CombinedReducer::new(ReducerMap::new(), true).unwrap();
        let state = reducer.reduce(&RootState::new(), &Action::init()).unwrap();
        assert!(state.is_empty());
    }

    #[test]
    fn slices_reduce_independently() {
        let map = ReducerMap::new()
            .with("counter", counter)
            .unwrap()
            .with("label", label)
            .unwrap();
        let reducer = CombinedReducer::new(map, true).unwrap();

        let state = reducer.reduce(&RootState::new(), &Action::init()).unwrap();
        assert_eq!(state.clone().into_value(), json!({ "counter": 0, "label": "" }));

        let state = reducer
            .reduce(&state, &Action::new("counter/increment"))
            .unwrap();
        let state = reducer
            .reduce(&state, &Action::new("label/set").with_payload(json!("hi")))
            .unwrap();
        assert_eq!(state.into_value(), json!({ "counter": 1, "label": "hi" }));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut map = ReducerMap::new();
        map.insert("counter", counter).unwrap();
        assert!(matches!(
            map.insert("counter", counter),
            Err(StoreError::DuplicateSlice(name)) if name == "counter"
        ));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn undefined_initial_state_fails_combination() {
        let nothing = |_: Option<&Value>, _: &Action| -> Option<Value> { None };
        let map = ReducerMap::new().with("nothing", nothing).unwrap();
        assert!(matches!(
            CombinedReducer::new(map, true),
            Err(StoreError::UndefinedInitialState { slice }) if slice == "nothing"
        ));
    }

    #[test]
    fn unknown_action_check_catches_reducers_that_only_know_init() {
        let map = ReducerMap::new().with("fragile", init_only).unwrap();
        assert!(matches!(
            CombinedReducer::new(map, true),
            Err(StoreError::UndefinedProbeState { slice }) if slice == "fragile"
        ));

        let map = ReducerMap::new().with("fragile", init_only).unwrap();
        assert!(CombinedReducer::new(map, false).is_ok());
    }

    #[test]
    fn undefined_state_during_dispatch_is_an_error() {
        let map = ReducerMap::new().with("label", label).unwrap();
        let reducer = CombinedReducer::new(map, true).unwrap();
        let state = reducer.reduce(&RootState::new(), &Action::init()).unwrap();

        let err = reducer
            .reduce(&state, &Action::new("label/set"))
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::UndefinedSliceState { slice, action }
                if slice == "label" && action == "label/set"
        ));
    }

    struct CountWarnings(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for CountWarnings {
        fn on_event(&self, event: &tracing::Event<'_>, _: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn count_warnings(f: impl FnOnce()) -> usize {
        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(CountWarnings(warnings.clone()));
        tracing::subscriber::with_default(subscriber, f);
        warnings.load(Ordering::SeqCst)
    }

    fn counter_only() -> CombinedReducer {
        let map = ReducerMap::new().with("counter", counter).unwrap();
        CombinedReducer::new(map, true).unwrap()
    }

    #[test]
    fn unexpected_keys_warn_once() {
        let reducer = counter_only();
        let preloaded = RootState::try_from(json!({ "counter": 7, "stale": true })).unwrap();

        let warned = count_warnings(|| {
            reducer.reduce(&preloaded, &Action::init()).unwrap();
        });
        assert_eq!(warned, 1);

        let warned = count_warnings(|| {
            reducer.reduce(&preloaded, &Action::init()).unwrap();
        });
        assert_eq!(warned, 0);
    }

    #[test]
    fn replace_does_not_warn_about_unexpected_keys() {
        let reducer = counter_only();
        let leftover = RootState::try_from(json!({ "counter": 7, "pending": [] })).unwrap();

        let warned = count_warnings(|| {
            reducer.reduce(&leftover, &Action::replace()).unwrap();
        });
        assert_eq!(warned, 0);

        // The key is remembered, so later actions stay quiet as well.
        let warned = count_warnings(|| {
            reducer
                .reduce(&leftover, &Action::new("counter/increment"))
                .unwrap();
        });
        assert_eq!(warned, 0);
    }

    #[test]
    fn unexpected_keys_are_dropped() {
        let map = ReducerMap::new().with("counter", counter).unwrap();
        let reducer = CombinedReducer::new(map, true).unwrap();
        let preloaded = RootState::try_from(json!({ "counter": 7, "stale": true })).unwrap();

        let state = reducer.reduce(&preloaded, &Action::init()).unwrap();
        assert_eq!(state.into_value(), json!({ "counter": 7 }));
        assert!(reducer.reported.lock().unwrap().contains("stale"));
    }
}
