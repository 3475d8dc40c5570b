//! Typed error type for the client crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection, timeout, or protocol-level failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered 404 for the addressed resource.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-success status.
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
