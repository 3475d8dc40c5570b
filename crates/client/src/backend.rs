//! The `WorkflowBackend` trait — every backend call the engine makes.
//!
//! The engine only ever talks to the collaborator through this trait, so
//! tests can swap in [`crate::mock::MockBackend`] and production wires in
//! [`crate::http::HttpBackend`].

use async_trait::async_trait;

use crate::error::ClientError;
use crate::models::{
    Activity, ActivityDetail, BookingAck, BookingRequest, LogAck, ThrottleDecision,
    ThrottleExecuteRequest, Trigger, WorkflowLogEntry,
};

#[async_trait]
pub trait WorkflowBackend: Send + Sync {
    /// All triggers registered against an item slug, unfiltered.
    async fn triggers_by_slug(&self, items_slug: &str) -> Result<Vec<Trigger>, ClientError>;

    /// The ordered activities of a workflow.
    async fn activities_by_workflow(
        &self,
        workflow_items_id: &str,
    ) -> Result<Vec<Activity>, ClientError>;

    /// One activity's action list.
    async fn activity_details(&self, activity_id: &str) -> Result<ActivityDetail, ClientError>;

    /// Server-authoritative throttle check-and-record.  Atomic on the
    /// server; never retried by this client.
    async fn throttle_execute(
        &self,
        request: &ThrottleExecuteRequest,
    ) -> Result<ThrottleDecision, ClientError>;

    /// Fire-and-forget audit write.
    async fn write_log(&self, entry: &WorkflowLogEntry) -> Result<LogAck, ClientError>;

    /// Create a booking/lead record from a submitted form effect.
    async fn create_booking(&self, request: &BookingRequest) -> Result<BookingAck, ClientError>;
}
