use crate::action::Action;
use crate::error::{Result, StoreError};
use crate::middleware::{Logger, Middleware};
use crate::reducer::{CombinedReducer, Reducer, ReducerMap, Slice, SliceReducer};
use crate::state::RootState;
use crate::store::Store;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Configuration for a store built from slice reducers.
///
/// Defaults: no slices, no preloaded state, the [`Logger`] middleware, and
/// development checks enabled.
pub struct StoreConfig {
    name: String,
    reducers: ReducerMap,
    // First slice name registered twice through the builder.
    duplicate: Option<String>,
    preloaded_state: Option<RootState>,
    default_middleware: bool,
    middleware: Vec<Arc<dyn Middleware<RootState, Action>>>,
    dev_checks: bool,
}

impl StoreConfig {
    pub fn new() -> Self {
        Self {
            name: "store".to_string(),
            reducers: ReducerMap::new(),
            duplicate: None,
            preloaded_state: None,
            default_middleware: true,
            middleware: Vec::new(),
            dev_checks: true,
        }
    }

    /// Name used for the store in log output.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Register a slice reducer under `name`.
    ///
    /// Registering a name twice makes [`configure_store`] fail with
    /// [`StoreError::DuplicateSlice`].
    pub fn reducer<R>(mut self, name: impl Into<String>, reducer: R) -> Self
    where
        R: SliceReducer + 'static,
    {
        self.register(name.into(), Box::new(reducer));
        self
    }

    /// Register a typed slice under its own name.
    pub fn slice<T>(mut self, slice: Slice<T>) -> Self
    where
        T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        let name = slice.name().to_string();
        self.register(name, Box::new(slice));
        self
    }

    /// Use `reducers` in place of anything registered so far.
    pub fn reducers(mut self, reducers: ReducerMap) -> Self {
        self.reducers = reducers;
        self.duplicate = None;
        self
    }

    pub fn preloaded_state(mut self, state: RootState) -> Self {
        self.preloaded_state = Some(state);
        self
    }

    /// Preload state from a JSON object.
    pub fn preloaded_state_json(self, json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|err| StoreError::InvalidPreloadedState(err.to_string()))?;
        Ok(self.preloaded_state(RootState::try_from(value)?))
    }

    /// Append a middleware. Appended middleware run after the defaults.
    pub fn middleware<M>(mut self, middleware: M) -> Self
    where
        M: Middleware<RootState, Action> + 'static,
    {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Drop every middleware configured so far, including the defaults.
    pub fn without_middleware(mut self) -> Self {
        self.default_middleware = false;
        self.middleware.clear();
        self
    }

    /// Enable or disable reducer probing and unexpected-key warnings.
    pub fn dev_checks(mut self, enabled: bool) -> Self {
        self.dev_checks = enabled;
        self
    }

    fn register(&mut self, name: String, reducer: Box<dyn SliceReducer>) {
        if let Err(StoreError::DuplicateSlice(name)) = self.reducers.insert_boxed(name, reducer) {
            self.duplicate.get_or_insert(name);
        }
    }

    fn into_middleware(self) -> Vec<Arc<dyn Middleware<RootState, Action>>> {
        let mut chain = if self.default_middleware {
            default_middleware(&self.name)
        } else {
            Vec::new()
        };
        chain.extend(self.middleware);
        chain
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The middleware every configured store starts with.
pub fn default_middleware(name: &str) -> Vec<Arc<dyn Middleware<RootState, Action>>> {
    vec![Arc::new(Logger::new(name))]
}

/// Build a store from `config`.
///
/// The slice reducers are combined, every slice is initialized from the
/// preloaded state (or from nothing) with `@@stowage/INIT`, and the store is
/// wrapped in the configured middleware.
///
/// # Examples
///
/// ```
/// use stowage::{configure_store, StoreConfig};
///
/// let store = configure_store(StoreConfig::new()).unwrap();
/// assert!(store.get_state().is_empty());
/// ```
pub fn configure_store(mut config: StoreConfig) -> Result<Store<RootState, Action>> {
    if let Some(name) = config.duplicate.take() {
        return Err(StoreError::DuplicateSlice(name));
    }

    let slices = config.reducers.len();
    let reducers = std::mem::take(&mut config.reducers);
    let reducer = CombinedReducer::new(reducers, config.dev_checks)?;
    let preloaded = config.preloaded_state.take().unwrap_or_default();
    let initial = reducer.reduce(&preloaded, &Action::init())?;

    let name = config.name.clone();
    let middleware = config.into_middleware();
    tracing::debug!(
        store = %name,
        slices,
        middleware = middleware.len(),
        "store configured"
    );
    Ok(Store::with_middleware(reducer, initial, middleware))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::Next;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    fn counter() -> Slice<i64> {
        Slice::new("counter", 0).case("increment", |count, _| *count += 1)
    }

    #[test]
    fn empty_config_yields_empty_state() {
        let store = configure_store(StoreConfig::new()).unwrap();
        assert!(store.get_state().is_empty());
        assert_eq!(serde_json::to_string(&*store.snapshot()).unwrap(), "{}");
    }

    #[test]
    fn preloaded_state_wins_over_initial() {
        let store = configure_store(
            StoreConfig::new()
                .slice(counter())
                .preloaded_state_json(r#"{ "counter": 41 }"#)
                .unwrap(),
        )
        .unwrap();

        store.dispatch(Action::new("counter/increment")).unwrap();
        assert_eq!(store.get_state().slice::<i64>("counter").unwrap(), Some(42));
    }

    #[test]
    fn preloaded_state_must_be_an_object() {
        assert!(matches!(
            StoreConfig::new().preloaded_state_json("[1, 2, 3]"),
            Err(StoreError::InvalidPreloadedState(_))
        ));
        assert!(matches!(
            StoreConfig::new().preloaded_state_json("{ nope"),
            Err(StoreError::InvalidPreloadedState(_))
        ));
    }

    #[test]
    fn duplicate_slices_fail_configuration() {
        let config = StoreConfig::new().slice(counter()).slice(counter());
        assert!(matches!(
            configure_store(config),
            Err(StoreError::DuplicateSlice(name)) if name == "counter"
        ));
    }

    #[test]
    fn slices_keep_registration_order() {
        let flag = |state: Option<&Value>, _: &Action| -> Option<Value> {
            Some(state.cloned().unwrap_or(json!(false)))
        };
        let store = configure_store(
            StoreConfig::new()
                .reducer("zeta", flag)
                .slice(counter())
                .reducer("alpha", flag),
        )
        .unwrap();

        let state = store.get_state();
        assert_eq!(state.keys().collect::<Vec<_>>(), vec!["zeta", "counter", "alpha"]);
    }

    #[test]
    fn middleware_runs_after_defaults() {
        struct Record(Arc<Mutex<Vec<String>>>);
        impl Middleware<RootState, Action> for Record {
            fn handle(
                &self,
                _: &Store<RootState, Action>,
                action: Action,
                next: Next<'_, RootState, Action>,
            ) -> Result<()> {
                self.0.lock().unwrap().push(action.kind().to_string());
                next.run(action)
            }
        }

        let seen = Arc::new(Mutex::new(Vec::new()));
        let store = configure_store(
            StoreConfig::new()
                .name("orders")
                .slice(counter())
                .middleware(Record(seen.clone())),
        )
        .unwrap();

        store.dispatch(Action::new("counter/increment")).unwrap();
        // INIT is reduced before middleware is attached.
        assert_eq!(*seen.lock().unwrap(), vec!["counter/increment"]);
        assert_eq!(store.get_state().slice::<i64>("counter").unwrap(), Some(1));
    }

    #[test]
    fn defaults_lead_the_chain() {
        struct Noop;
        impl Middleware<RootState, Action> for Noop {
            fn handle(
                &self,
                _: &Store<RootState, Action>,
                action: Action,
                next: Next<'_, RootState, Action>,
            ) -> Result<()> {
                next.run(action)
            }
        }

        let chain = StoreConfig::new().name("loud").middleware(Noop).into_middleware();
        assert_eq!(chain.len(), 2);

        let chain = StoreConfig::new()
            .without_middleware()
            .middleware(Noop)
            .into_middleware();
        assert_eq!(chain.len(), 1);
    }
}
