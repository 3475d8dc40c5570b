//! Internal error type for store implementations.
//!
//! Never crosses the [`crate::ThrottleStore`] boundary — implementations
//! swallow these and fail open.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
