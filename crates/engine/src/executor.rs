//! The workflow engine — orchestrates one invocation end to end.
//!
//! `WorkflowEngine` is the entry point consumers call on a qualifying
//! page/item event:
//! 1. Resolves the applicable trigger (miss → silent no-op).
//! 2. Gates it through the throttle evaluator (deny → silent no-op).
//! 3. Runs all activities, isolating per-activity failures.
//! 4. Queues the produced effects for display.
//! 5. Writes the audit log exactly once — success or partial failure.
//!
//! One invocation runs at a time per engine; the phase tracker enforces
//! this and doubles as UI-facing progress.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use actions::{EventName, FormCorrelation, InAppEffect, ItemContext, ItemType};
use client::{ActivityOutcome, BookingRequest, ThrottleDenyReason, WorkflowBackend};
use queue::EffectQueue;
use store::ThrottleStore;

use crate::error::EngineError;
use crate::logger::ExecutionLogger;
use crate::resolver::TriggerResolver;
use crate::runner::ActivityRunner;
use crate::state::{Phase, PhaseTracker};
use crate::throttle::ThrottleEvaluator;

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

/// A qualifying page/item event, as reported by the host page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageEvent {
    pub item_slug: String,
    #[serde(default)]
    pub item_id: Option<String>,
    pub item_type: ItemType,
    pub trigger_event: EventName,
    /// Item fields available for `{{item.<field>}}` substitution.
    #[serde(default)]
    pub item_data: serde_json::Value,
}

/// How an invocation ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InvocationOutcome {
    /// No trigger registered for the slug, or none matching type+event.
    NoTrigger,
    /// A trigger matched but its throttle denied execution.
    Throttled {
        reason: Option<ThrottleDenyReason>,
    },
    /// The trigger executed; activities ran (possibly with failures).
    Executed {
        /// Audit record id, when the log write landed.
        log_id: Option<String>,
        activity_log: Vec<ActivityOutcome>,
    },
}

/// The result handed back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct Invocation {
    pub id: Uuid,
    /// Effects produced by this invocation (also queued on the engine).
    pub effects: Vec<InAppEffect>,
    pub outcome: InvocationOutcome,
}

// ---------------------------------------------------------------------------
// WorkflowEngine
// ---------------------------------------------------------------------------

/// Orchestrator for trigger-driven workflow execution.
pub struct WorkflowEngine {
    backend: Arc<dyn WorkflowBackend>,
    resolver: TriggerResolver,
    evaluator: ThrottleEvaluator,
    runner: ActivityRunner,
    logger: ExecutionLogger,
    effects: EffectQueue,
    phase: PhaseTracker,
    user_id: Option<String>,
}

impl WorkflowEngine {
    /// Build an engine over a backend and a throttle record store.
    /// `user_id` is the signed-in user, when known; anonymous engines
    /// evaluate every throttle device-locally.
    pub fn new(
        backend: Arc<dyn WorkflowBackend>,
        store: Arc<dyn ThrottleStore>,
        user_id: Option<String>,
    ) -> Self {
        Self {
            resolver: TriggerResolver::new(Arc::clone(&backend)),
            evaluator: ThrottleEvaluator::new(Arc::clone(&backend), store),
            runner: ActivityRunner::new(Arc::clone(&backend)),
            logger: ExecutionLogger::new(Arc::clone(&backend)),
            backend,
            effects: EffectQueue::new(),
            phase: PhaseTracker::new(),
            user_id,
        }
    }

    /// Handle one page/item event, start to finish.
    ///
    /// # Errors
    /// Returns an error only for the non-degradable failures: the
    /// top-level trigger fetch, an authoritative server throttle check, or
    /// an invocation started while another is in flight.  Everything else
    /// degrades (see the component docs) and still produces an
    /// [`Invocation`].
    #[instrument(skip(self, event), fields(
        invocation_id = tracing::field::Empty,
        slug = %event.item_slug,
        event = %event.trigger_event,
    ))]
    pub async fn handle_event(&self, event: PageEvent) -> Result<Invocation, EngineError> {
        let invocation_id = Uuid::new_v4();
        tracing::Span::current().record("invocation_id", tracing::field::display(invocation_id));

        self.phase.advance(Phase::ResolvingTrigger)?;

        let trigger = match self
            .resolver
            .resolve(&event.item_slug, event.item_type, event.trigger_event)
            .await
        {
            Ok(Some(trigger)) => trigger,
            Ok(None) => {
                // Resolution miss: silent no-op, nothing logged.
                self.phase.advance(Phase::Idle)?;
                return Ok(Invocation {
                    id: invocation_id,
                    effects: Vec::new(),
                    outcome: InvocationOutcome::NoTrigger,
                });
            }
            Err(e) => {
                let _ = self.phase.advance(Phase::Idle);
                return Err(e);
            }
        };

        self.phase.advance(Phase::CheckingThrottle)?;

        let decision = match self
            .evaluator
            .check_and_record(&trigger, &event.item_slug, self.user_id.as_deref())
            .await
        {
            Ok(decision) => decision,
            Err(e) => {
                let _ = self.phase.advance(Phase::Idle);
                return Err(e);
            }
        };

        if !decision.allowed {
            // Throttle deny: silent no-op, nothing logged.
            info!(trigger_id = %trigger.id, reason = ?decision.reason, "trigger throttled");
            self.phase.advance(Phase::Idle)?;
            return Ok(Invocation {
                id: invocation_id,
                effects: Vec::new(),
                outcome: InvocationOutcome::Throttled { reason: decision.reason },
            });
        }

        // Past the throttle gate the invocation always reaches the log.
        self.phase.advance(Phase::FetchingActivities)?;
        let activities = self.runner.fetch_activities(&trigger).await;

        let item = ItemContext {
            slug: event.item_slug.clone(),
            id: event.item_id.clone(),
            item_type: event.item_type,
            data: event.item_data.clone(),
        };

        self.phase.advance(Phase::ExecutingActivities)?;
        let report = self.runner.execute(&trigger, &activities, &item).await;

        self.phase.advance(Phase::Logging)?;
        let log_id = self
            .logger
            .log(&trigger, &item, event.trigger_event, &report)
            .await;

        self.effects.push_all(report.effects.iter().cloned());

        self.phase.advance(Phase::Complete)?;
        self.phase.advance(Phase::Idle)?;

        info!(
            trigger_id = %trigger.id,
            effects = report.effects.len(),
            "invocation complete"
        );

        Ok(Invocation {
            id: invocation_id,
            effects: report.effects,
            outcome: InvocationOutcome::Executed {
                log_id,
                activity_log: report.activity_log,
            },
        })
    }

    /// Current progress of the in-flight invocation (`Idle` between them).
    pub fn phase(&self) -> Phase {
        self.phase.current()
    }

    /// Effects awaiting display, in queue order.
    pub fn pending_effects(&self) -> Vec<InAppEffect> {
        self.effects.snapshot()
    }

    /// Dismiss one pending effect by index.
    pub fn dismiss(&self, index: usize) -> Option<InAppEffect> {
        self.effects.dismiss(index)
    }

    /// Dismiss everything pending.
    pub fn dismiss_all(&self) {
        self.effects.dismiss_all()
    }

    /// Submit a form effect's data, creating a booking record correlated
    /// back to the trigger/activity that produced the form.
    ///
    /// # Errors
    /// Propagates the backend failure; the caller owns retry/UI handling.
    pub async fn submit_form(
        &self,
        correlation: &FormCorrelation,
        form_data: serde_json::Value,
    ) -> Result<String, EngineError> {
        let request = BookingRequest {
            workflow_items_id: correlation.workflow_items_id.clone(),
            activity_id: correlation.activity_id.clone(),
            items_id: correlation.item_id.clone(),
            items_slug: correlation.item_slug.clone(),
            items_type: correlation.item_type,
            form_data,
        };

        let ack = self.backend.create_booking(&request).await?;
        info!(booking_id = %ack.id, "form submission booked");
        Ok(ack.id)
    }
}
