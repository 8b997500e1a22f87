//! State containers.
//!
//! A [`Store`] holds state, reduces dispatched actions into new state, and
//! notifies subscribers. [`configure_store`] builds the common case: a store
//! over [`RootState`](crate::state::RootState) assembled from named slice
//! reducers, wrapped in default middleware.

mod config;
mod selector;
mod store;
mod subscription;

pub use config::{configure_store, default_middleware, StoreConfig};
pub use selector::Selector;
pub use store::{Dispatch, Store};
pub use subscription::Subscription;
