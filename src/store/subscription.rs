use crate::store::store::{write, Subscribers};
use std::sync::Weak;

/// RAII handle for a store subscriber.
///
/// Dropping the handle unsubscribes. Unsubscribing after the store itself
/// has been dropped does nothing.
#[must_use = "dropping a Subscription unsubscribes immediately; call `detach` to keep it"]
pub struct Subscription {
    remove: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub(crate) fn new<S: 'static>(id: usize, subscribers: Weak<Subscribers<S>>) -> Self {
        Self {
            remove: Some(Box::new(move || {
                if let Some(subscribers) = subscribers.upgrade() {
                    write(&*subscribers).retain(|(existing, _)| *existing != id);
                }
            })),
        }
    }

    /// Stop receiving notifications.
    pub fn unsubscribe(mut self) {
        self.remove_now();
    }

    /// Keep the subscriber registered for as long as the store lives.
    pub fn detach(mut self) {
        self.remove = None;
    }

    fn remove_now(&mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.remove_now();
    }
}

#[cfg(test)]
mod tests {
    use crate::store::Store;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter() -> Store<u32, u32> {
        Store::new(|count: &u32, delta: &u32| count + delta, 0)
    }

    #[test]
    fn drop_unsubscribes() {
        let store = counter();
        let calls = Arc::new(AtomicUsize::new(0));
        {
            let calls = calls.clone();
            let _subscription = store.subscribe(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
            });
            store.dispatch(1).unwrap();
        }
        store.dispatch(1).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn detach_keeps_subscriber() {
        let store = counter();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        store
            .subscribe(move |_| {
                calls_clone.fetch_add(1, Ordering::SeqCst);
            })
            .detach();

        store.dispatch(1).unwrap();
        store.dispatch(1).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.subscriber_count(), 1);
    }

    #[test]
    fn only_the_owner_is_removed() {
        let store = counter();
        let first = store.subscribe(|_| {});
        let second = store.subscribe(|_| {});
        assert_eq!(store.subscriber_count(), 2);

        first.unsubscribe();
        assert_eq!(store.subscriber_count(), 1);
        drop(second);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn outliving_the_store_is_harmless() {
        let store = counter();
        let subscription = store.subscribe(|_| {});
        drop(store);
        subscription.unsubscribe();
    }
}
