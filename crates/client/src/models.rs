//! Wire models for the collaborator backend.
//!
//! These map 1-to-1 onto the backend's JSON shapes (snake_case).  They
//! carry no behaviour beyond small constructors; domain logic lives in the
//! `engine` crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use actions::{Action, EventName, ItemType};

// ---------------------------------------------------------------------------
// Triggers
// ---------------------------------------------------------------------------

/// An automation rule binding an item type + event name to a workflow.
/// Created and edited by the workflow-authoring system; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trigger {
    pub id: String,
    pub workflow_items_id: String,
    pub items_type: ItemType,
    pub event_name: EventName,
    /// Tie-break ordering among triggers matching the same slug; lowest wins.
    #[serde(default)]
    pub seq: i64,
    #[serde(default)]
    pub event_info: EventInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventInfo {
    #[serde(default)]
    pub throttle: Option<ThrottleConfig>,
}

// ---------------------------------------------------------------------------
// Throttle
// ---------------------------------------------------------------------------

/// The time window over which execution count is bounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrottleScope {
    #[default]
    None,
    Session,
    Day,
    Week,
    Lifetime,
}

/// Which storage backend(s) enforce the throttle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrottleTarget {
    #[default]
    Browser,
    User,
    Both,
}

/// Rate-limiting policy attached to a trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleConfig {
    pub enabled: bool,
    #[serde(default)]
    pub scope: ThrottleScope,
    #[serde(default)]
    pub target: ThrottleTarget,
    /// Omitted means unlimited count; a cooldown may still apply.
    #[serde(default)]
    pub max_executions: Option<u32>,
    /// Minimum spacing between executions regardless of count.
    #[serde(default)]
    pub cooldown_minutes: Option<f64>,
    /// Monotonic; bumping it invalidates all previously cached records.
    #[serde(default)]
    pub version: u32,
    /// Epoch-ms; any cached record whose window started before this is
    /// invalidated.
    #[serde(default)]
    pub reset_at: Option<i64>,
}

/// Why a throttled execution was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum ThrottleDenyReason {
    CooldownActive,
    MaxExecutionsReached,
    /// A server-side reason this client does not model.
    Other,
}

impl From<String> for ThrottleDenyReason {
    fn from(s: String) -> Self {
        match s.as_str() {
            "cooldown_active" => Self::CooldownActive,
            "max_executions_reached" => Self::MaxExecutionsReached,
            _ => Self::Other,
        }
    }
}

/// The subset of the throttle policy the server check-and-record call takes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottlePolicy {
    pub enabled: bool,
    pub scope: ThrottleScope,
    pub target: ThrottleTarget,
    #[serde(default)]
    pub max_executions: Option<u32>,
    #[serde(default)]
    pub cooldown_minutes: Option<f64>,
}

impl From<&ThrottleConfig> for ThrottlePolicy {
    fn from(config: &ThrottleConfig) -> Self {
        Self {
            enabled: config.enabled,
            scope: config.scope,
            target: config.target,
            max_executions: config.max_executions,
            cooldown_minutes: config.cooldown_minutes,
        }
    }
}

/// Body of the server-authoritative check-and-record call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleExecuteRequest {
    pub trigger_id: String,
    pub workflow_items_id: String,
    pub user_id: String,
    pub items_slug: String,
    pub items_type: ItemType,
    pub event_name: EventName,
    pub throttle: ThrottlePolicy,
}

/// The allow/deny verdict of a throttle check (local or server-side).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleDecision {
    pub allowed: bool,
    #[serde(default)]
    pub reason: Option<ThrottleDenyReason>,
    /// Server-side record id, when the server performed the check.
    #[serde(default)]
    pub id: Option<String>,
}

impl ThrottleDecision {
    pub fn allowed() -> Self {
        Self { allowed: true, reason: None, id: None }
    }

    pub fn denied(reason: ThrottleDenyReason) -> Self {
        Self { allowed: false, reason: Some(reason), id: None }
    }
}

// ---------------------------------------------------------------------------
// Activities
// ---------------------------------------------------------------------------

/// An ordered step within a workflow; ordering is implicit in fetch order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub name: String,
}

/// Detail payload for one activity — its ordered action list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityDetail {
    #[serde(default)]
    pub activity_info: ActivityInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityInfo {
    #[serde(default)]
    pub actions: Vec<Action>,
}

// ---------------------------------------------------------------------------
// Execution logs
// ---------------------------------------------------------------------------

/// Per-activity outcome captured in the audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityOutcome {
    pub id: String,
    pub name: String,
    pub action_types: Vec<String>,
    pub success: bool,
}

/// The `log` payload of an execution audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogPayload {
    pub event_name: EventName,
    pub item_type: ItemType,
    /// Flattened, in execution order across all activities.
    pub executed_action_types: Vec<String>,
    pub activities: Vec<ActivityOutcome>,
    pub queued_effects: usize,
    pub timestamp: DateTime<Utc>,
}

/// One audit record per top-level invocation; never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowLogEntry {
    pub workflows_items_id: String,
    #[serde(default)]
    pub items_id: Option<String>,
    pub items_slug: String,
    pub item_type: ItemType,
    pub event: EventName,
    pub log: LogPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogAck {
    pub id: String,
}

// ---------------------------------------------------------------------------
// Bookings
// ---------------------------------------------------------------------------

/// Form-submission callback payload, correlated back to the trigger/activity
/// whose form effect the user filled in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub workflow_items_id: String,
    pub activity_id: String,
    #[serde(default)]
    pub items_id: Option<String>,
    pub items_slug: String,
    pub items_type: ItemType,
    pub form_data: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingAck {
    pub id: String,
}
