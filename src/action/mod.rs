//! Actions: the only input a store reduces.

mod action;

pub use action::{Action, INIT, REPLACE, RESERVED_PREFIX};
