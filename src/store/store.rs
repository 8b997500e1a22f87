use crate::action::Action;
use crate::error::{Result, StoreError};
use crate::middleware::{Middleware, Next};
use crate::reducer::{CombinedReducer, Reducer, ReducerMap};
use crate::state::RootState;
use crate::store::{Selector, Subscription};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak,
};
use std::thread::{self, ThreadId};

type Subscriber<S> = Arc<dyn Fn(&S) + Send + Sync>;
pub(crate) type Subscribers<S> = RwLock<Vec<(usize, Subscriber<S>)>>;

struct Shared<S, A> {
    state: RwLock<Arc<S>>,
    reducer: RwLock<Arc<dyn Reducer<S, A>>>,
    middleware: Vec<Arc<dyn Middleware<S, A>>>,
    subscribers: Arc<Subscribers<S>>,
    next_id: AtomicUsize,
    // Serializes reductions across threads.
    reduction: Mutex<()>,
    // Thread currently running the reducer, if any.
    reducing: Mutex<Option<ThreadId>>,
}

/// A thread-safe container for application state.
///
/// The state only changes by dispatching an action: the action passes through
/// the middleware chain, the reducer computes the next state, and every
/// subscriber is notified. Cloning a store yields another handle to the same
/// state.
///
/// # Examples
///
/// ```
/// use stowage::Store;
///
/// #[derive(Debug)]
/// enum Counter {
///     Increment,
///     Add(i32),
/// }
///
/// let store = Store::new(
///     |count: &i32, action: &Counter| match action {
///         Counter::Increment => count + 1,
///         Counter::Add(n) => count + n,
///     },
///     0,
/// );
///
/// store.dispatch(Counter::Increment).unwrap();
/// store.dispatch(Counter::Add(41)).unwrap();
/// assert_eq!(store.get_state(), 42);
/// ```
pub struct Store<S, A> {
    inner: Arc<Shared<S, A>>,
}

impl<S, A> Store<S, A>
where
    S: Send + Sync + 'static,
    A: Send + 'static,
{
    /// Create a store without middleware.
    pub fn new<R>(reducer: R, initial: S) -> Self
    where
        R: Reducer<S, A> + 'static,
    {
        Self::with_middleware(reducer, initial, Vec::new())
    }

    /// Create a store whose dispatches pass through `middleware` in order.
    pub fn with_middleware<R>(
        reducer: R,
        initial: S,
        middleware: Vec<Arc<dyn Middleware<S, A>>>,
    ) -> Self
    where
        R: Reducer<S, A> + 'static,
    {
        Self {
            inner: Arc::new(Shared {
                state: RwLock::new(Arc::new(initial)),
                reducer: RwLock::new(Arc::new(reducer)),
                middleware,
                subscribers: Arc::new(RwLock::new(Vec::new())),
                next_id: AtomicUsize::new(0),
                reduction: Mutex::new(()),
                reducing: Mutex::new(None),
            }),
        }
    }

    /// Get a clone of the current state.
    pub fn get_state(&self) -> S
    where
        S: Clone,
    {
        S::clone(&*self.snapshot())
    }

    /// Get the current state without cloning it.
    ///
    /// The snapshot does not change when later actions are dispatched.
    pub fn snapshot(&self) -> Arc<S> {
        Arc::clone(&*read(&self.inner.state))
    }

    /// Read the current state with a function.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&S) -> R,
    {
        f(&*self.snapshot())
    }

    /// Dispatch an action.
    ///
    /// Returns once the action has been reduced (or swallowed by a
    /// middleware) and every subscriber has been notified. On error the
    /// state is left as it was and no subscriber is called.
    pub fn dispatch(&self, action: A) -> Result<()> {
        self.run_chain(0, action)
    }

    /// A handle that can dispatch into this store and do nothing else.
    pub fn dispatcher(&self) -> Dispatch<S, A> {
        Dispatch {
            store: self.clone(),
        }
    }

    pub(crate) fn run_chain(&self, index: usize, action: A) -> Result<()> {
        match self.inner.middleware.get(index) {
            Some(middleware) => middleware.handle(self, action, Next::new(self, index + 1)),
            None => self.reduce(action),
        }
    }

    fn reduce(&self, action: A) -> Result<()> {
        {
            let _reduction = ReductionGuard::enter(&self.inner.reduction, &self.inner.reducing)?;
            let reducer = Arc::clone(&*read(&self.inner.reducer));
            let current = self.snapshot();
            let next = Arc::new(reducer.reduce(&current, &action)?);
            *write(&self.inner.state) = next;
        }
        self.notify();
        Ok(())
    }

    /// Subscribe to state changes.
    ///
    /// The callback is called with the latest state after every successful
    /// dispatch. It stays registered until the returned [`Subscription`] is
    /// dropped or unsubscribed; call [`Subscription::detach`] to keep it for
    /// the lifetime of the store.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        write(&self.inner.subscribers).push((id, Arc::new(callback)));
        Subscription::new(id, Arc::downgrade(&self.inner.subscribers))
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        read(&self.inner.subscribers).len()
    }

    fn notify(&self) {
        // Subscribers may subscribe or unsubscribe while being notified.
        let subscribers: Vec<Subscriber<S>> = read(&self.inner.subscribers)
            .iter()
            .map(|(_, subscriber)| Arc::clone(subscriber))
            .collect();
        // Each subscriber sees the latest state: an earlier subscriber, or
        // another thread, may have dispatched since this notification began.
        for subscriber in subscribers {
            subscriber(&self.snapshot());
        }
    }

    /// Swap the reducer. The current state is kept.
    pub fn replace_reducer<R>(&self, reducer: R) -> Result<()>
    where
        R: Reducer<S, A> + 'static,
    {
        let _reduction = ReductionGuard::enter(&self.inner.reduction, &self.inner.reducing)?;
        *write(&self.inner.reducer) = Arc::new(reducer);
        Ok(())
    }

    /// A memoized value derived from the state.
    pub fn select<T, F>(&self, compute: F) -> Selector<S, T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(&S) -> T + Send + Sync + 'static,
    {
        let store = self.clone();
        Selector::new(move || store.snapshot(), compute)
    }

    /// Watch a value derived from the state.
    ///
    /// `callback` is called right away with the current value and afterwards
    /// only when a dispatch changes it.
    pub fn watch<T, F, C>(&self, select: F, callback: C) -> Subscription
    where
        T: Clone + PartialEq + Send + 'static,
        F: Fn(&S) -> T + Send + Sync + 'static,
        C: Fn(&T) + Send + Sync + 'static,
    {
        let watcher = Arc::new(Watcher {
            shared: Arc::downgrade(&self.inner),
            select,
            callback,
            last: Mutex::new(None),
        });

        // Registered before the first check so no dispatch can fall between
        // reading the initial value and subscribing.
        let subscription = self.subscribe({
            let watcher = Arc::clone(&watcher);
            move |_| watcher.check()
        });
        watcher.check();
        subscription
    }
}

impl Store<RootState, Action> {
    /// Replace every slice reducer.
    ///
    /// The new slices are checked the same way [`configure_store`] checks
    /// them, then `@@stowage/REPLACE` is dispatched so they can initialize.
    /// State of slices that are no longer registered is dropped.
    ///
    /// [`configure_store`]: crate::store::configure_store
    pub fn replace_reducers(&self, reducers: ReducerMap) -> Result<()> {
        let names: Vec<String> = reducers.names().map(str::to_string).collect();
        self.replace_reducer(CombinedReducer::new(reducers, true)?)?;
        tracing::debug!(slices = ?names, "reducers replaced");
        self.dispatch(Action::replace())
    }
}

impl<S, A> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Watcher<S, A, T, F, C> {
    shared: Weak<Shared<S, A>>,
    select: F,
    callback: C,
    last: Mutex<Option<T>>,
}

impl<S, A, T, F, C> Watcher<S, A, T, F, C>
where
    T: Clone + PartialEq,
    F: Fn(&S) -> T,
    C: Fn(&T),
{
    fn check(&self) {
        let value = {
            let mut last = lock(&self.last);
            // Select from the state current under the lock, never from a
            // snapshot taken before it, so `last` only moves forward.
            let Some(shared) = self.shared.upgrade() else {
                return;
            };
            let state = Arc::clone(&*read(&shared.state));
            let value = (self.select)(&state);
            if last.as_ref() == Some(&value) {
                return;
            }
            *last = Some(value.clone());
            value
        };
        (self.callback)(&value);
    }
}

/// Dispatch half of a [`Store`].
pub struct Dispatch<S, A> {
    store: Store<S, A>,
}

impl<S, A> Dispatch<S, A>
where
    S: Send + Sync + 'static,
    A: Send + 'static,
{
    pub fn dispatch(&self, action: A) -> Result<()> {
        self.store.dispatch(action)
    }
}

impl<S, A> Clone for Dispatch<S, A> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

/// Held while a reducer runs.
struct ReductionGuard<'a> {
    _serial: MutexGuard<'a, ()>,
    reducing: &'a Mutex<Option<ThreadId>>,
}

impl<'a> ReductionGuard<'a> {
    fn enter(serial: &'a Mutex<()>, reducing: &'a Mutex<Option<ThreadId>>) -> Result<Self> {
        let current = thread::current().id();
        if *lock(reducing) == Some(current) {
            return Err(StoreError::ReentrantDispatch);
        }

        let serial = lock(serial);
        *lock(reducing) = Some(current);
        Ok(Self {
            _serial: serial,
            reducing,
        })
    }
}

impl Drop for ReductionGuard<'_> {
    fn drop(&mut self) {
        *lock(self.reducing) = None;
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
