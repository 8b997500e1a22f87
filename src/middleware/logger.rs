use crate::error::Result;
use crate::middleware::{Middleware, Next};
use crate::store::Store;
use std::fmt::Debug;

/// Logs every action with `tracing`.
///
/// Actions are logged at `debug` before they are forwarded, the resulting
/// state at `trace`, and failures at `warn`. Errors are passed through
/// unchanged.
#[derive(Clone, Debug)]
pub struct Logger {
    store: String,
}

impl Logger {
    /// `store` names the store in every log line.
    pub fn new(store: impl Into<String>) -> Self {
        Self {
            store: store.into(),
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new("store")
    }
}

impl<S, A> Middleware<S, A> for Logger
where
    S: Debug + Send + Sync + 'static,
    A: Debug + Send + 'static,
{
    fn handle(&self, store: &Store<S, A>, action: A, next: Next<'_, S, A>) -> Result<()> {
        let described = format!("{:?}", action);
        tracing::debug!(store = %self.store, action = %described, "dispatching");

        let result = next.run(action);
        match &result {
            Ok(()) => tracing::trace!(
                store = %self.store,
                action = %described,
                state = ?store.snapshot(),
                "state updated"
            ),
            Err(err) => tracing::warn!(
                store = %self.store,
                action = %described,
                error = %err,
                "dispatch failed"
            ),
        }
        result
    }
}
