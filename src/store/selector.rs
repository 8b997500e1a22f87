use crate::store::store::lock;
use std::sync::{Arc, Mutex, Weak};

type Source<S> = Arc<dyn Fn() -> Arc<S> + Send + Sync>;
type Compute<S, T> = Arc<dyn Fn(&S) -> T + Send + Sync>;

/// A memoized value derived from store state.
///
/// The value is recomputed only when the store holds a different state
/// snapshot than the one it was last computed from. Selectors are created
/// with [`Store::select`](crate::Store::select).
///
/// # Examples
///
/// ```
/// use stowage::Store;
///
/// let store = Store::new(|items: &Vec<u32>, item: &u32| {
///     let mut items = items.clone();
///     items.push(*item);
///     items
/// }, Vec::new());
///
/// let total = store.select(|items| items.iter().sum::<u32>());
/// assert_eq!(total.get(), 0);
///
/// store.dispatch(4).unwrap();
/// store.dispatch(6).unwrap();
/// assert_eq!(total.get(), 10);
/// ```
pub struct Selector<S, T> {
    source: Source<S>,
    compute: Compute<S, T>,
    cached: Arc<Mutex<Option<(Weak<S>, T)>>>,
}

impl<S, T> Selector<S, T>
where
    S: Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new<Src, F>(source: Src, compute: F) -> Self
    where
        Src: Fn() -> Arc<S> + Send + Sync + 'static,
        F: Fn(&S) -> T + Send + Sync + 'static,
    {
        Self {
            source: Arc::new(source),
            compute: Arc::new(compute),
            cached: Arc::new(Mutex::new(None)),
        }
    }

    /// Get the current value, recomputing if the state has changed.
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    /// Read the current value with a function without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let state = (self.source)();
        let mut cached = lock(&self.cached);

        let fresh = matches!(
            &*cached,
            Some((computed_from, _)) if std::ptr::eq(computed_from.as_ptr(), Arc::as_ptr(&state))
        );
        if !fresh {
            *cached = None;
        }

        let (_, value) =
            cached.get_or_insert_with(|| (Arc::downgrade(&state), (self.compute)(&*state)));
        f(value)
    }
}

impl<S, T> Clone for Selector<S, T> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            compute: Arc::clone(&self.compute),
            cached: Arc::clone(&self.cached),
        }
    }
}
