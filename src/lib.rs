//! # Stowage
//!
//! A predictable state container for Rust applications.
//!
//! State lives in a [`Store`] and changes only when an action is dispatched:
//! the action passes through the store's middleware, a reducer computes the
//! next state, and subscribers are notified.
//!
//! ## Stores (Low-level)
//!
//! - `Store<S, A>` - Thread-safe container driven by any [`Reducer`]
//! - `Subscription` - RAII handle for change listeners
//! - `Selector<S, T>` - Memoized values derived from state
//! - `Middleware<S, A>` - Hooks between dispatch and the reducer
//!
//! ## Slices (Application state)
//!
//! Convenient composition for application-wide state:
//! - `RootState` - JSON object keyed by slice name
//! - `Slice<T>` - Typed slice with case reducers and action creators
//! - `configure_store` - Build a store from a `StoreConfig`
//! - [`app`] - The process-wide application store

pub mod action;
pub mod app;
pub mod error;
pub mod middleware;
pub mod reducer;
pub mod state;
pub mod store;

// Re-export main types for convenience
pub use action::Action;
pub use error::{Result, StoreError};
pub use middleware::{Logger, Middleware, Next};
pub use reducer::{CombinedReducer, Reducer, ReducerMap, Slice, SliceActions, SliceReducer};
pub use state::RootState;
pub use store::{configure_store, Dispatch, Selector, Store, StoreConfig, Subscription};
