//! Reducers and reducer composition.
//!
//! A [`Reducer`] drives a whole store. Applications built on [`RootState`]
//! split their state into named slices instead: each [`SliceReducer`] owns one
//! key, a [`ReducerMap`] collects them, and [`CombinedReducer`] runs them all
//! for every action. [`Slice`] is a typed slice reducer built from case
//! reducers.
//!
//! [`RootState`]: crate::state::RootState

mod combine;
mod reducer;
mod slice;

pub use combine::{CombinedReducer, ReducerMap, SliceReducer};
pub use reducer::Reducer;
pub use slice::{Slice, SliceActions};
