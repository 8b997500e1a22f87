//! The root state shape produced by combined slice reducers.

mod root;

pub use root::RootState;
