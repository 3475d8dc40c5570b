//! Engine-level error types.

use thiserror::Error;

/// Errors that abort an invocation.
///
/// Most failure modes in this subsystem degrade instead of erroring (see
/// the per-component docs); only the top-level trigger fetch, an
/// authoritative server throttle check, and booking submission surface
/// errors to the caller.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Collaborator backend failure on a non-degradable call.
    #[error("backend error: {0}")]
    Backend(#[from] client::ClientError),

    /// The orchestrator was driven through an illegal phase transition
    /// (e.g. a second invocation started while one is in flight).
    #[error(transparent)]
    InvalidTransition(#[from] crate::state::TransitionError),
}
