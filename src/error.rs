//! Error types for store construction and dispatch.

use thiserror::Error;

/// Errors raised while building a store or dispatching into it.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A reducer tried to dispatch into the store it is reducing.
    #[error("reducers may not dispatch actions")]
    ReentrantDispatch,

    #[error("slice `{0}` is registered more than once")]
    DuplicateSlice(String),

    #[error("slice `{slice}` returned no state during initialization")]
    UndefinedInitialState { slice: String },

    #[error("slice `{slice}` returned no state when probed with an unknown action")]
    UndefinedProbeState { slice: String },

    #[error("slice `{slice}` returned no state for action `{action}`")]
    UndefinedSliceState { slice: String, action: String },

    #[error("failed to decode state of slice `{slice}`: {source}")]
    SliceDecode {
        slice: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode state of slice `{slice}`: {source}")]
    SliceEncode {
        slice: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid preloaded state: {0}")]
    InvalidPreloadedState(String),

    /// A reducer could not compute the next state.
    #[error("reducer failed: {0}")]
    Reducer(String),

    /// A middleware refused to forward an action.
    #[error("action rejected by {middleware}: {reason}")]
    Rejected {
        middleware: &'static str,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_slice() {
        let err = StoreError::UndefinedSliceState {
            slice: "todos".to_string(),
            action: "todos/add".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "slice `todos` returned no state for action `todos/add`"
        );
    }

    #[test]
    fn decode_error_keeps_source() {
        use std::error::Error as _;

        let source = serde_json::from_str::<u32>("\"nope\"").unwrap_err();
        let err = StoreError::SliceDecode {
            slice: "counter".to_string(),
            source,
        };
        assert!(err.source().is_some());
    }
}
