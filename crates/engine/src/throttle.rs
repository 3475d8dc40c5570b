//! Throttle evaluation — multi-scope rate limiting with version/reset
//! invalidation.
//!
//! The pure window/count math lives in [`evaluate_local`]; the
//! [`ThrottleEvaluator`] wires it to the record store and, for the
//! `user`/`both` targets, to the backend's atomic check-and-record call.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveTime, TimeZone, Weekday};
use tracing::warn;

use client::{
    ThrottleConfig, ThrottleDecision, ThrottleDenyReason, ThrottleExecuteRequest, ThrottlePolicy,
    ThrottleScope, ThrottleTarget, Trigger, WorkflowBackend,
};
use store::{ThrottleRecord, ThrottleStore};

use crate::error::EngineError;

const MS_PER_MINUTE: f64 = 60_000.0;

// ---------------------------------------------------------------------------
// Pure evaluation
// ---------------------------------------------------------------------------

/// Result of evaluating the local record against a config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalCheck {
    Deny(ThrottleDenyReason),
    /// Allowed; `next` is the record to persist if the overall decision
    /// (including any server veto) comes out allowed.
    Allow { next: ThrottleRecord },
}

/// Epoch-ms start of the scope window containing `now`, or `None` when the
/// scope has no time window (`session` counts against the all-time record).
fn window_start_ms(scope: ThrottleScope, now: DateTime<Local>) -> Option<i64> {
    match scope {
        ThrottleScope::None | ThrottleScope::Session => None,
        ThrottleScope::Lifetime => Some(0),
        ThrottleScope::Day => Some(start_of_local_day_ms(now.date_naive())),
        ThrottleScope::Week => {
            let week = now.date_naive().week(Weekday::Sun);
            Some(start_of_local_day_ms(week.first_day()))
        }
    }
}

fn start_of_local_day_ms(date: chrono::NaiveDate) -> i64 {
    let midnight = date.and_time(NaiveTime::MIN);
    match Local.from_local_datetime(&midnight).earliest() {
        Some(dt) => dt.timestamp_millis(),
        // Local midnight skipped by a DST jump; approximate with UTC.
        None => midnight.and_utc().timestamp_millis(),
    }
}

/// Decide allow/deny for a trigger against its local record.
///
/// Order of checks follows the throttle contract: hard invalidation
/// (version / reset) first, then cooldown, then count-in-window.  A record
/// whose window has rolled over is discarded and the allowed execution
/// starts a fresh window.
pub fn evaluate_local(
    config: &ThrottleConfig,
    record: Option<&ThrottleRecord>,
    now: DateTime<Local>,
) -> LocalCheck {
    let now_ms = now.timestamp_millis();

    // Hard cache invalidation, independent of scope math.
    let record = record
        .filter(|r| r.version >= config.version)
        .filter(|r| config.reset_at.map_or(true, |reset| r.first_execution >= reset));

    let Some(record) = record else {
        return LocalCheck::Allow { next: ThrottleRecord::fresh(now_ms, config.version) };
    };

    // Cooldown is checked before any count math.
    if let Some(cooldown) = config.cooldown_minutes {
        if ((now_ms - record.last_execution) as f64) < cooldown * MS_PER_MINUTE {
            return LocalCheck::Deny(ThrottleDenyReason::CooldownActive);
        }
    }

    if let Some(max) = config.max_executions {
        let in_window = match window_start_ms(config.scope, now) {
            None => true,
            Some(start) => record.first_execution >= start,
        };

        if !in_window {
            // Stale window: discard the record and start over.
            return LocalCheck::Allow { next: ThrottleRecord::fresh(now_ms, config.version) };
        }
        if record.count >= max {
            return LocalCheck::Deny(ThrottleDenyReason::MaxExecutionsReached);
        }
    }

    let next = if record.version == config.version {
        record.incremented(now_ms)
    } else {
        ThrottleRecord::fresh(now_ms, config.version)
    };
    LocalCheck::Allow { next }
}

// ---------------------------------------------------------------------------
// ThrottleEvaluator
// ---------------------------------------------------------------------------

/// Gates trigger execution, reconciling the local record store with the
/// backend's authoritative per-user counter.
pub struct ThrottleEvaluator {
    backend: Arc<dyn WorkflowBackend>,
    store: Arc<dyn ThrottleStore>,
}

impl ThrottleEvaluator {
    pub fn new(backend: Arc<dyn WorkflowBackend>, store: Arc<dyn ThrottleStore>) -> Self {
        Self { backend, store }
    }

    /// Check the trigger's throttle and record the execution on allow.
    ///
    /// # Errors
    /// Only a `user`-target check with a known user can fail: there the
    /// backend is the single authority and its failure propagates.  Every
    /// other path degrades locally.
    pub async fn check_and_record(
        &self,
        trigger: &Trigger,
        items_slug: &str,
        user_id: Option<&str>,
    ) -> Result<ThrottleDecision, EngineError> {
        let Some(config) = trigger.event_info.throttle.as_ref() else {
            return Ok(ThrottleDecision::allowed());
        };
        if !config.enabled || config.scope == ThrottleScope::None {
            return Ok(ThrottleDecision::allowed());
        }

        match config.target {
            ThrottleTarget::Browser => Ok(self.check_local(trigger, config).await),

            ThrottleTarget::User => match user_id {
                Some(user) => {
                    let request = self.server_request(trigger, config, items_slug, user);
                    Ok(self.backend.throttle_execute(&request).await?)
                }
                // Anonymous: no per-user authority exists, act device-local.
                None => Ok(self.check_local(trigger, config).await),
            },

            ThrottleTarget::Both => {
                // Local first: cheap, and a local deny needs no round trip.
                let record = self.store.read(&trigger.id).await;
                let next = match evaluate_local(config, record.as_ref(), Local::now()) {
                    LocalCheck::Deny(reason) => return Ok(ThrottleDecision::denied(reason)),
                    LocalCheck::Allow { next } => next,
                };

                let Some(user) = user_id else {
                    self.store.write(&trigger.id, &next).await;
                    return Ok(ThrottleDecision::allowed());
                };

                let request = self.server_request(trigger, config, items_slug, user);
                match self.backend.throttle_execute(&request).await {
                    // Server veto is authoritative: no local record update.
                    Ok(decision) if !decision.allowed => Ok(decision),
                    Ok(decision) => {
                        self.store.write(&trigger.id, &next).await;
                        Ok(decision)
                    }
                    Err(e) => {
                        // Availability over strict consistency: proceed on
                        // the local decision.  May over-execute across
                        // devices until the server is reachable again.
                        warn!(trigger_id = %trigger.id, error = %e,
                            "server throttle check failed, degrading to local decision");
                        self.store.write(&trigger.id, &next).await;
                        Ok(ThrottleDecision::allowed())
                    }
                }
            }
        }
    }

    async fn check_local(&self, trigger: &Trigger, config: &ThrottleConfig) -> ThrottleDecision {
        let record = self.store.read(&trigger.id).await;
        match evaluate_local(config, record.as_ref(), Local::now()) {
            LocalCheck::Deny(reason) => ThrottleDecision::denied(reason),
            LocalCheck::Allow { next } => {
                self.store.write(&trigger.id, &next).await;
                ThrottleDecision::allowed()
            }
        }
    }

    fn server_request(
        &self,
        trigger: &Trigger,
        config: &ThrottleConfig,
        items_slug: &str,
        user_id: &str,
    ) -> ThrottleExecuteRequest {
        ThrottleExecuteRequest {
            trigger_id: trigger.id.clone(),
            workflow_items_id: trigger.workflow_items_id.clone(),
            user_id: user_id.to_owned(),
            items_slug: items_slug.to_owned(),
            items_type: trigger.items_type,
            event_name: trigger.event_name,
            throttle: ThrottlePolicy::from(config),
        }
    }
}
