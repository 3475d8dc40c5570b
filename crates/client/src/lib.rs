//! `client` crate — the collaborator backend boundary.
//!
//! Wire models for every endpoint this subsystem consumes, the
//! [`WorkflowBackend`] trait the engine dispatches through, a `reqwest`
//! implementation for production, and a programmable [`mock::MockBackend`]
//! for tests.  No business logic lives here.

pub mod backend;
pub mod error;
pub mod http;
pub mod mock;
pub mod models;

pub use backend::WorkflowBackend;
pub use error::ClientError;
pub use http::HttpBackend;
pub use models::{
    Activity, ActivityDetail, ActivityInfo, ActivityOutcome, BookingAck, BookingRequest, EventInfo,
    LogAck, LogPayload, ThrottleConfig, ThrottleDecision, ThrottleDenyReason,
    ThrottleExecuteRequest, ThrottlePolicy, ThrottleScope, ThrottleTarget, Trigger,
    WorkflowLogEntry,
};
