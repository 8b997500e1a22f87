use crate::error::Result;

/// Computes the next state of a store from its current state and an action.
///
/// Reducers must not mutate anything outside of the state they return. Any
/// closure `Fn(&S, &A) -> S` is a reducer that never fails.
///
/// # Examples
///
/// ```
/// use stowage::{Reducer, Store};
///
/// let store = Store::new(|count: &i64, delta: &i64| count + delta, 0);
/// store.dispatch(5).unwrap();
/// assert_eq!(store.get_state(), 5);
/// ```
pub trait Reducer<S, A>: Send + Sync {
    fn reduce(&self, state: &S, action: &A) -> Result<S>;
}

impl<S, A, F> Reducer<S, A> for F
where
    F: Fn(&S, &A) -> S + Send + Sync,
{
    fn reduce(&self, state: &S, action: &A) -> Result<S> {
        Ok(self(state, action))
    }
}
