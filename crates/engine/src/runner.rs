//! Activity execution with per-activity failure isolation.

use std::sync::Arc;

use tracing::{info, warn};

use actions::{interpret, InAppEffect, ItemContext, WorkflowContext};
use client::{Activity, ActivityOutcome, ClientError, Trigger, WorkflowBackend};

/// Everything one invocation's activities produced.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Effects in activity order, action order within each activity.
    pub effects: Vec<InAppEffect>,
    /// Flattened action-type tags, same order as `effects` production.
    pub executed_action_types: Vec<String>,
    /// One outcome per activity, in fetch order.
    pub activity_log: Vec<ActivityOutcome>,
}

/// What a single activity yielded when it succeeded.
struct ActivityExecution {
    effects: Vec<InAppEffect>,
    action_types: Vec<String>,
}

/// Runs a resolved trigger's activities, isolating failures so one broken
/// activity never stops the rest.
pub struct ActivityRunner {
    backend: Arc<dyn WorkflowBackend>,
}

impl ActivityRunner {
    pub fn new(backend: Arc<dyn WorkflowBackend>) -> Self {
        Self { backend }
    }

    /// Fetch the trigger's activity list.  Any failure — including the
    /// workflow not being found — degrades to an empty list rather than
    /// aborting the invocation.
    pub async fn fetch_activities(&self, trigger: &Trigger) -> Vec<Activity> {
        match self.backend.activities_by_workflow(&trigger.workflow_items_id).await {
            Ok(activities) => activities,
            Err(e) => {
                warn!(workflow_items_id = %trigger.workflow_items_id, error = %e,
                    "activities fetch failed, continuing with none");
                Vec::new()
            }
        }
    }

    /// Execute activities sequentially, collecting per-activity outcomes.
    /// Failures are captured as `success: false` outcomes; execution
    /// always continues with the next activity.
    pub async fn execute(
        &self,
        trigger: &Trigger,
        activities: &[Activity],
        item: &ItemContext,
    ) -> RunReport {
        let mut report = RunReport::default();

        for activity in activities {
            match self.run_activity(trigger, activity, item).await {
                Ok(execution) => {
                    report.activity_log.push(ActivityOutcome {
                        id: activity.id.clone(),
                        name: activity.name.clone(),
                        action_types: execution.action_types.clone(),
                        success: true,
                    });
                    report.executed_action_types.extend(execution.action_types);
                    report.effects.extend(execution.effects);
                }
                Err(e) => {
                    warn!(activity_id = %activity.id, error = %e,
                        "activity failed, continuing with next");
                    report.activity_log.push(ActivityOutcome {
                        id: activity.id.clone(),
                        name: activity.name.clone(),
                        action_types: Vec::new(),
                        success: false,
                    });
                }
            }
        }

        info!(
            activities = report.activity_log.len(),
            effects = report.effects.len(),
            "activity run finished"
        );
        report
    }

    /// Convenience wrapper: fetch and execute in one call.
    pub async fn run(&self, trigger: &Trigger, item: &ItemContext) -> RunReport {
        let activities = self.fetch_activities(trigger).await;
        self.execute(trigger, &activities, item).await
    }

    async fn run_activity(
        &self,
        trigger: &Trigger,
        activity: &Activity,
        item: &ItemContext,
    ) -> Result<ActivityExecution, ClientError> {
        let detail = match self.backend.activity_details(&activity.id).await {
            Ok(detail) => detail,
            // A missing detail record means "no actions", which is fine.
            Err(e) if e.is_not_found() => {
                return Ok(ActivityExecution { effects: Vec::new(), action_types: Vec::new() });
            }
            Err(e) => return Err(e),
        };

        let workflow = WorkflowContext {
            workflow_items_id: trigger.workflow_items_id.clone(),
            activity_id: activity.id.clone(),
        };

        let mut effects = Vec::new();
        let mut action_types = Vec::new();
        for action in &detail.activity_info.actions {
            if let Some(effect) = interpret(action, item, &workflow) {
                effects.push(effect);
            }
            if let Some(kind) = action.kind() {
                action_types.push(kind.to_owned());
            }
        }

        Ok(ActivityExecution { effects, action_types })
    }
}
