//! Middleware between `dispatch` and the reducer.
//!
//! Middleware run in registration order. Each one receives the action and a
//! [`Next`] continuation leading to the rest of the chain; the reducer sits at
//! the end. A middleware may forward the action, swallow it by never calling
//! `next`, or dispatch new actions through the store (those start again at
//! the head of the chain).

mod logger;

pub use logger::Logger;

use crate::error::Result;
use crate::store::Store;

pub trait Middleware<S, A>: Send + Sync {
    fn handle(&self, store: &Store<S, A>, action: A, next: Next<'_, S, A>) -> Result<()>;
}

/// The remainder of a middleware chain.
pub struct Next<'a, S, A> {
    store: &'a Store<S, A>,
    index: usize,
}

impl<'a, S, A> Next<'a, S, A>
where
    S: Send + Sync + 'static,
    A: Send + 'static,
{
    pub(crate) fn new(store: &'a Store<S, A>, index: usize) -> Self {
        Self { store, index }
    }

    /// Pass `action` to the next middleware, or to the reducer.
    pub fn run(&self, action: A) -> Result<()> {
        self.store.run_chain(self.index, action)
    }
}
