//! The application store.
//!
//! One shared [`AppStore`] for the whole process, plus the types the rest of
//! the application uses to talk about it: [`RootState`] is what reading the
//! store yields and [`AppDispatch`] is what dispatching goes through.
//!
//! No slices are registered yet, so the application state is the empty
//! object. Register slices in [`config`] as features need them.
//!
//! Code that wants isolation (tests in particular) should build its own
//! store with `configure_store(app::config())` instead of sharing the
//! process-wide one.

use crate::action::Action;
use crate::store::{configure_store, Dispatch, Store, StoreConfig};
use std::sync::OnceLock;

pub use crate::state::RootState;

/// Type of the application store.
pub type AppStore = Store<RootState, Action>;

/// Type of the application's dispatch handle.
pub type AppDispatch = Dispatch<RootState, Action>;

/// Configuration of the application store.
pub fn config() -> StoreConfig {
    StoreConfig::new().name("app")
}

/// The process-wide application store.
///
/// Created from [`config`] on first use; every later call returns the same
/// store.
///
/// # Panics
///
/// Panics on first use if [`config`] describes a store that cannot be built,
/// which is only possible once slices are registered.
///
/// # Examples
///
/// ```
/// use stowage::app::{self, AppDispatch, RootState};
///
/// let state: RootState = app::store().get_state();
/// assert!(state.is_empty());
///
/// let dispatch: AppDispatch = app::store().dispatcher();
/// dispatch.dispatch("app/started".into()).unwrap();
/// ```
pub fn store() -> &'static AppStore {
    static STORE: OnceLock<AppStore> = OnceLock::new();
    STORE.get_or_init(|| {
        configure_store(config())
            .unwrap_or_else(|err| panic!("application store failed to initialize: {err}"))
    })
}
