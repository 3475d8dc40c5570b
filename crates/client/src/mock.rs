//! `MockBackend` — a programmable test double for [`WorkflowBackend`].
//!
//! Useful in unit and integration tests where a live collaborator backend
//! is either unavailable or irrelevant.  Behaviour is configured per
//! endpoint at construction time; every call is recorded for assertions.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::backend::WorkflowBackend;
use crate::error::ClientError;
use crate::models::{
    Activity, ActivityDetail, BookingAck, BookingRequest, LogAck, ThrottleDecision,
    ThrottleExecuteRequest, Trigger, WorkflowLogEntry,
};

/// What a mocked endpoint will do when called.
#[derive(Debug, Clone)]
pub enum MockOutcome<T> {
    Ok(T),
    NotFound,
    Fail,
}

impl<T: Clone> MockOutcome<T> {
    fn materialize(&self, resource: &str) -> Result<T, ClientError> {
        match self {
            Self::Ok(value) => Ok(value.clone()),
            Self::NotFound => Err(ClientError::NotFound(resource.to_owned())),
            Self::Fail => Err(ClientError::Status {
                status: 500,
                body: format!("mock failure for {resource}"),
            }),
        }
    }
}

/// A mock backend that records every call it receives and answers with
/// programmer-specified results.
pub struct MockBackend {
    triggers: MockOutcome<Vec<Trigger>>,
    activities: MockOutcome<Vec<Activity>>,
    /// Per-activity detail behaviour; ids not present answer `NotFound`.
    details: HashMap<String, MockOutcome<ActivityDetail>>,
    throttle: MockOutcome<ThrottleDecision>,
    log_ack: MockOutcome<LogAck>,
    booking_ack: MockOutcome<BookingAck>,

    /// All slugs queried for triggers (in call order).
    pub trigger_queries: Mutex<Vec<String>>,
    /// All workflow ids queried for activities.
    pub activity_queries: Mutex<Vec<String>>,
    /// All activity ids queried for details.
    pub detail_queries: Mutex<Vec<String>>,
    /// All server-side throttle check requests.
    pub throttle_calls: Mutex<Vec<ThrottleExecuteRequest>>,
    /// All audit records written.
    pub logged: Mutex<Vec<WorkflowLogEntry>>,
    /// All booking requests submitted.
    pub bookings: Mutex<Vec<BookingRequest>>,
}

impl MockBackend {
    /// A backend with no triggers, no activities, and permissive defaults
    /// everywhere else.
    pub fn new() -> Self {
        Self {
            triggers: MockOutcome::Ok(Vec::new()),
            activities: MockOutcome::Ok(Vec::new()),
            details: HashMap::new(),
            throttle: MockOutcome::Ok(ThrottleDecision::allowed()),
            log_ack: MockOutcome::Ok(LogAck { id: "log-1".into() }),
            booking_ack: MockOutcome::Ok(BookingAck { id: "booking-1".into() }),
            trigger_queries: Mutex::new(Vec::new()),
            activity_queries: Mutex::new(Vec::new()),
            detail_queries: Mutex::new(Vec::new()),
            throttle_calls: Mutex::new(Vec::new()),
            logged: Mutex::new(Vec::new()),
            bookings: Mutex::new(Vec::new()),
        }
    }

    pub fn with_triggers(mut self, triggers: Vec<Trigger>) -> Self {
        self.triggers = MockOutcome::Ok(triggers);
        self
    }

    pub fn failing_triggers(mut self) -> Self {
        self.triggers = MockOutcome::Fail;
        self
    }

    pub fn with_activities(mut self, activities: Vec<Activity>) -> Self {
        self.activities = MockOutcome::Ok(activities);
        self
    }

    pub fn failing_activities(mut self) -> Self {
        self.activities = MockOutcome::Fail;
        self
    }

    pub fn with_activity_detail(mut self, activity_id: impl Into<String>, detail: ActivityDetail) -> Self {
        self.details.insert(activity_id.into(), MockOutcome::Ok(detail));
        self
    }

    pub fn failing_activity_detail(mut self, activity_id: impl Into<String>) -> Self {
        self.details.insert(activity_id.into(), MockOutcome::Fail);
        self
    }

    pub fn with_throttle_decision(mut self, decision: ThrottleDecision) -> Self {
        self.throttle = MockOutcome::Ok(decision);
        self
    }

    pub fn failing_throttle(mut self) -> Self {
        self.throttle = MockOutcome::Fail;
        self
    }

    pub fn failing_log(mut self) -> Self {
        self.log_ack = MockOutcome::Fail;
        self
    }

    /// Number of audit records written so far.
    pub fn log_count(&self) -> usize {
        self.logged.lock().unwrap().len()
    }

    /// Number of server-side throttle checks performed so far.
    pub fn throttle_call_count(&self) -> usize {
        self.throttle_calls.lock().unwrap().len()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkflowBackend for MockBackend {
    async fn triggers_by_slug(&self, items_slug: &str) -> Result<Vec<Trigger>, ClientError> {
        self.trigger_queries.lock().unwrap().push(items_slug.to_owned());
        self.triggers.materialize("triggers")
    }

    async fn activities_by_workflow(
        &self,
        workflow_items_id: &str,
    ) -> Result<Vec<Activity>, ClientError> {
        self.activity_queries.lock().unwrap().push(workflow_items_id.to_owned());
        self.activities.materialize("activities")
    }

    async fn activity_details(&self, activity_id: &str) -> Result<ActivityDetail, ClientError> {
        self.detail_queries.lock().unwrap().push(activity_id.to_owned());
        match self.details.get(activity_id) {
            Some(outcome) => outcome.materialize(activity_id),
            None => Err(ClientError::NotFound(activity_id.to_owned())),
        }
    }

    async fn throttle_execute(
        &self,
        request: &ThrottleExecuteRequest,
    ) -> Result<ThrottleDecision, ClientError> {
        self.throttle_calls.lock().unwrap().push(request.clone());
        self.throttle.materialize("throttle-execute")
    }

    async fn write_log(&self, entry: &WorkflowLogEntry) -> Result<LogAck, ClientError> {
        self.logged.lock().unwrap().push(entry.clone());
        self.log_ack.materialize("workflow-log")
    }

    async fn create_booking(&self, request: &BookingRequest) -> Result<BookingAck, ClientError> {
        self.bookings.lock().unwrap().push(request.clone());
        self.booking_ack.materialize("booking")
    }
}
