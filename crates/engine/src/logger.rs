//! The execution audit logger — one record per invocation, fire-and-forget.

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use actions::{EventName, ItemContext};
use client::{LogPayload, Trigger, WorkflowBackend, WorkflowLogEntry};

use crate::runner::RunReport;

/// Writes the per-invocation audit record.
pub struct ExecutionLogger {
    backend: Arc<dyn WorkflowBackend>,
}

impl ExecutionLogger {
    pub fn new(backend: Arc<dyn WorkflowBackend>) -> Self {
        Self { backend }
    }

    /// Write the audit record summarizing this invocation.
    ///
    /// Called exactly once per invocation that resolved a trigger and
    /// passed the throttle gate — success or partial failure alike.  A
    /// failed write is reported here and swallowed; audit loss must never
    /// block effect display.  Returns the record id when the write landed.
    pub async fn log(
        &self,
        trigger: &Trigger,
        item: &ItemContext,
        event: EventName,
        report: &RunReport,
    ) -> Option<String> {
        let entry = WorkflowLogEntry {
            workflows_items_id: trigger.workflow_items_id.clone(),
            items_id: item.id.clone(),
            items_slug: item.slug.clone(),
            item_type: item.item_type,
            event,
            log: LogPayload {
                event_name: trigger.event_name,
                item_type: item.item_type,
                executed_action_types: report.executed_action_types.clone(),
                activities: report.activity_log.clone(),
                queued_effects: report.effects.len(),
                timestamp: Utc::now(),
            },
        };

        match self.backend.write_log(&entry).await {
            Ok(ack) => Some(ack.id),
            Err(e) => {
                warn!(workflow_items_id = %trigger.workflow_items_id, error = %e,
                    "execution log write failed");
                None
            }
        }
    }
}
