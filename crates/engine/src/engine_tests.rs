//! Scenario tests for the workflow engine.
//!
//! These drive the full orchestrator against `MockBackend` and
//! `MemoryStore`, so no live collaborator backend or filesystem state is
//! required.  Pure throttle math is covered in `throttle.rs`; these tests
//! pin the end-to-end guarantees: exactly-once logging, the no-log rule,
//! per-activity isolation, and local/server throttle reconciliation.

use std::sync::Arc;

use serde_json::json;

use actions::{Action, EventName, InAppEffect, ItemType};
use client::mock::MockBackend;
use client::{
    Activity, ActivityDetail, ActivityInfo, EventInfo, ThrottleConfig, ThrottleDecision,
    ThrottleDenyReason, ThrottleScope, ThrottleTarget, Trigger, WorkflowBackend,
};
use store::{MemoryStore, ThrottleRecord, ThrottleStore};

use crate::executor::{InvocationOutcome, PageEvent, WorkflowEngine};
use crate::state::Phase;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn trigger(id: &str, throttle: Option<ThrottleConfig>) -> Trigger {
    Trigger {
        id: id.into(),
        workflow_items_id: "wf-1".into(),
        items_type: ItemType::Class,
        event_name: EventName::View,
        seq: 0,
        event_info: EventInfo { throttle },
    }
}

fn throttle(scope: ThrottleScope, target: ThrottleTarget, max: Option<u32>) -> ThrottleConfig {
    ThrottleConfig {
        enabled: true,
        scope,
        target,
        max_executions: max,
        cooldown_minutes: None,
        version: 1,
        reset_at: None,
    }
}

fn activity(id: &str, name: &str) -> Activity {
    Activity { id: id.into(), name: name.into() }
}

fn message_detail(message: &str) -> ActivityDetail {
    ActivityDetail {
        activity_info: ActivityInfo {
            actions: vec![Action::InAppMessage {
                title: None,
                message: message.into(),
                severity: None,
                duration_ms: None,
            }],
        },
    }
}

fn view_event() -> PageEvent {
    PageEvent {
        item_slug: "rock-climbing-101".into(),
        item_id: Some("item-1".into()),
        item_type: ItemType::Class,
        trigger_event: EventName::View,
        item_data: json!({ "name": "Rock Club" }),
    }
}

fn setup(
    backend: MockBackend,
    user_id: Option<&str>,
) -> (WorkflowEngine, Arc<MockBackend>, Arc<MemoryStore>) {
    let backend = Arc::new(backend);
    let store = Arc::new(MemoryStore::new());
    let engine = WorkflowEngine::new(
        Arc::clone(&backend) as Arc<dyn WorkflowBackend>,
        Arc::clone(&store) as Arc<dyn ThrottleStore>,
        user_id.map(str::to_owned),
    );
    (engine, backend, store)
}

fn toast_messages(effects: &[InAppEffect]) -> Vec<String> {
    effects
        .iter()
        .map(|e| match e {
            InAppEffect::Toast { message, .. } => message.clone(),
            other => panic!("expected toast, got {other:?}"),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Exactly-once logging and activity isolation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn one_failing_activity_never_stops_the_others() {
    let backend = MockBackend::new()
        .with_triggers(vec![trigger("trg-1", None)])
        .with_activities(vec![
            activity("act-1", "welcome"),
            activity("act-2", "broken"),
            activity("act-3", "followup"),
        ])
        .with_activity_detail("act-1", message_detail("first"))
        .failing_activity_detail("act-2")
        .with_activity_detail("act-3", message_detail("third"));

    let (engine, backend, _store) = setup(backend, None);
    let invocation = engine.handle_event(view_event()).await.expect("invocation runs");

    // Activities 1 and 3 still produced their effects.
    assert_eq!(toast_messages(&invocation.effects), vec!["first", "third"]);

    match invocation.outcome {
        InvocationOutcome::Executed { activity_log, .. } => {
            let successes: Vec<bool> = activity_log.iter().map(|a| a.success).collect();
            assert_eq!(successes, vec![true, false, true]);
            assert_eq!(activity_log[1].action_types, Vec::<String>::new());
        }
        other => panic!("expected Executed, got {other:?}"),
    }

    // Exactly one audit record, despite the failure in the middle.
    assert_eq!(backend.log_count(), 1);
}

#[tokio::test]
async fn log_is_written_even_when_every_activity_fails() {
    let backend = MockBackend::new()
        .with_triggers(vec![trigger("trg-1", None)])
        .with_activities(vec![activity("act-1", "broken"), activity("act-2", "broken")])
        .failing_activity_detail("act-1")
        .failing_activity_detail("act-2");

    let (engine, backend, _store) = setup(backend, None);
    let invocation = engine.handle_event(view_event()).await.expect("invocation runs");

    assert!(invocation.effects.is_empty());
    assert_eq!(backend.log_count(), 1);
}

#[tokio::test]
async fn log_write_failure_is_swallowed() {
    let backend = MockBackend::new()
        .with_triggers(vec![trigger("trg-1", None)])
        .failing_log();

    let (engine, _backend, _store) = setup(backend, None);
    let invocation = engine.handle_event(view_event()).await.expect("invocation still succeeds");

    match invocation.outcome {
        InvocationOutcome::Executed { log_id, .. } => assert!(log_id.is_none()),
        other => panic!("expected Executed, got {other:?}"),
    }
    assert_eq!(engine.phase(), Phase::Idle);
}

#[tokio::test]
async fn log_payload_summarizes_the_run() {
    let backend = MockBackend::new()
        .with_triggers(vec![trigger("trg-1", None)])
        .with_activities(vec![activity("act-1", "welcome")])
        .with_activity_detail("act-1", message_detail("Hello {{item.name}}"));

    let (engine, backend, _store) = setup(backend, None);
    engine.handle_event(view_event()).await.expect("invocation runs");

    let logged = backend.logged.lock().unwrap();
    let entry = logged.first().expect("one log entry");
    assert_eq!(entry.workflows_items_id, "wf-1");
    assert_eq!(entry.items_slug, "rock-climbing-101");
    assert_eq!(entry.items_id.as_deref(), Some("item-1"));
    assert_eq!(entry.event, EventName::View);
    assert_eq!(entry.log.executed_action_types, vec!["in_app_message"]);
    assert_eq!(entry.log.queued_effects, 1);
    assert_eq!(entry.log.activities.len(), 1);
    assert!(entry.log.activities[0].success);
}

// ---------------------------------------------------------------------------
// The no-log guarantee
// ---------------------------------------------------------------------------

#[tokio::test]
async fn no_triggers_registered_means_no_log() {
    let (engine, backend, _store) = setup(MockBackend::new(), None);

    let invocation = engine.handle_event(view_event()).await.expect("no-op invocation");

    assert_eq!(invocation.outcome, InvocationOutcome::NoTrigger);
    assert!(invocation.effects.is_empty());
    assert_eq!(backend.log_count(), 0);
    assert_eq!(engine.phase(), Phase::Idle);
}

#[tokio::test]
async fn mismatched_trigger_means_no_log() {
    let mut mismatched = trigger("trg-1", None);
    mismatched.event_name = EventName::Purchase;

    let backend = MockBackend::new().with_triggers(vec![mismatched]);
    let (engine, backend, _store) = setup(backend, None);

    let invocation = engine.handle_event(view_event()).await.expect("no-op invocation");

    assert_eq!(invocation.outcome, InvocationOutcome::NoTrigger);
    assert_eq!(backend.log_count(), 0);
}

#[tokio::test]
async fn throttled_trigger_means_no_log_and_no_effects() {
    let cfg = throttle(ThrottleScope::Session, ThrottleTarget::Browser, Some(1));
    let backend = MockBackend::new()
        .with_triggers(vec![trigger("trg-1", Some(cfg))])
        .with_activities(vec![activity("act-1", "welcome")])
        .with_activity_detail("act-1", message_detail("hi"));

    let (engine, backend, store) = setup(backend, None);
    // Already at max under the current config version.
    store.seed("trg-1", ThrottleRecord { count: 1, first_execution: 1, last_execution: 1, version: 1 });

    let invocation = engine.handle_event(view_event()).await.expect("throttled invocation");

    assert_eq!(
        invocation.outcome,
        InvocationOutcome::Throttled { reason: Some(ThrottleDenyReason::MaxExecutionsReached) }
    );
    assert!(invocation.effects.is_empty());
    assert!(engine.pending_effects().is_empty());
    assert_eq!(backend.log_count(), 0);
    assert_eq!(engine.phase(), Phase::Idle);
}

#[tokio::test]
async fn trigger_fetch_failure_propagates_without_logging() {
    let backend = MockBackend::new().failing_triggers();
    let (engine, backend, _store) = setup(backend, None);

    let result = engine.handle_event(view_event()).await;

    assert!(result.is_err());
    assert_eq!(backend.log_count(), 0);
    assert_eq!(engine.phase(), Phase::Idle);
}

// ---------------------------------------------------------------------------
// Throttle target reconciliation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn browser_target_never_contacts_the_server() {
    let cfg = throttle(ThrottleScope::Session, ThrottleTarget::Browser, Some(3));
    let backend = MockBackend::new().with_triggers(vec![trigger("trg-1", Some(cfg))]);

    let (engine, backend, store) = setup(backend, Some("user-1"));
    engine.handle_event(view_event()).await.expect("invocation runs");

    assert_eq!(backend.throttle_call_count(), 0);
    assert_eq!(store.read("trg-1").await.expect("record written").count, 1);
}

#[tokio::test]
async fn anonymous_user_target_falls_back_to_local_only() {
    let cfg = throttle(ThrottleScope::Session, ThrottleTarget::User, Some(3));
    let backend = MockBackend::new().with_triggers(vec![trigger("trg-1", Some(cfg))]);

    // No user id: identical to browser target, zero server calls.
    let (engine, backend, store) = setup(backend, None);
    engine.handle_event(view_event()).await.expect("invocation runs");

    assert_eq!(backend.throttle_call_count(), 0);
    assert_eq!(store.read("trg-1").await.expect("record written").count, 1);
}

#[tokio::test]
async fn user_target_delegates_entirely_to_the_server() {
    let cfg = throttle(ThrottleScope::Day, ThrottleTarget::User, Some(3));
    let backend = MockBackend::new().with_triggers(vec![trigger("trg-1", Some(cfg))]);

    let (engine, backend, store) = setup(backend, Some("user-1"));
    engine.handle_event(view_event()).await.expect("invocation runs");

    assert_eq!(backend.throttle_call_count(), 1);
    let request = backend.throttle_calls.lock().unwrap()[0].clone();
    assert_eq!(request.trigger_id, "trg-1");
    assert_eq!(request.user_id, "user-1");
    // Server-side recording only; no local record is kept.
    assert!(store.is_empty());
}

#[tokio::test]
async fn user_target_server_failure_aborts_the_invocation() {
    let cfg = throttle(ThrottleScope::Day, ThrottleTarget::User, Some(3));
    let backend = MockBackend::new()
        .with_triggers(vec![trigger("trg-1", Some(cfg))])
        .failing_throttle();

    let (engine, backend, _store) = setup(backend, Some("user-1"));
    let result = engine.handle_event(view_event()).await;

    assert!(result.is_err());
    assert_eq!(backend.log_count(), 0);
    assert_eq!(engine.phase(), Phase::Idle);
}

#[tokio::test]
async fn both_target_server_veto_wins_and_skips_local_record() {
    let cfg = throttle(ThrottleScope::Day, ThrottleTarget::Both, Some(3));
    let backend = MockBackend::new()
        .with_triggers(vec![trigger("trg-1", Some(cfg))])
        .with_throttle_decision(ThrottleDecision::denied(ThrottleDenyReason::MaxExecutionsReached));

    let (engine, backend, store) = setup(backend, Some("user-1"));
    let invocation = engine.handle_event(view_event()).await.expect("throttled invocation");

    assert_eq!(
        invocation.outcome,
        InvocationOutcome::Throttled { reason: Some(ThrottleDenyReason::MaxExecutionsReached) }
    );
    // Locally allowed, but the veto means no local increment either.
    assert!(store.is_empty());
    assert_eq!(backend.log_count(), 0);
}

#[tokio::test]
async fn both_target_local_deny_short_circuits_before_the_server() {
    let cfg = throttle(ThrottleScope::Session, ThrottleTarget::Both, Some(1));
    let backend = MockBackend::new().with_triggers(vec![trigger("trg-1", Some(cfg))]);

    let (engine, backend, store) = setup(backend, Some("user-1"));
    store.seed("trg-1", ThrottleRecord { count: 1, first_execution: 1, last_execution: 1, version: 1 });

    let invocation = engine.handle_event(view_event()).await.expect("throttled invocation");

    assert!(matches!(invocation.outcome, InvocationOutcome::Throttled { .. }));
    assert_eq!(backend.throttle_call_count(), 0);
}

#[tokio::test]
async fn both_target_server_failure_degrades_to_local_decision() {
    let cfg = throttle(ThrottleScope::Session, ThrottleTarget::Both, Some(3));
    let backend = MockBackend::new()
        .with_triggers(vec![trigger("trg-1", Some(cfg))])
        .failing_throttle();

    let (engine, backend, store) = setup(backend, Some("user-1"));
    let invocation = engine.handle_event(view_event()).await.expect("invocation degrades");

    assert!(matches!(invocation.outcome, InvocationOutcome::Executed { .. }));
    assert_eq!(backend.log_count(), 1);
    assert_eq!(store.read("trg-1").await.expect("record written").count, 1);
}

#[tokio::test]
async fn disabled_throttle_records_nothing() {
    let mut cfg = throttle(ThrottleScope::Session, ThrottleTarget::Both, Some(1));
    cfg.enabled = false;
    let backend = MockBackend::new().with_triggers(vec![trigger("trg-1", Some(cfg))]);

    let (engine, backend, store) = setup(backend, Some("user-1"));
    let invocation = engine.handle_event(view_event()).await.expect("invocation runs");

    assert!(matches!(invocation.outcome, InvocationOutcome::Executed { .. }));
    assert!(store.is_empty());
    assert_eq!(backend.throttle_call_count(), 0);
}

// ---------------------------------------------------------------------------
// Effects and substitution, end to end
// ---------------------------------------------------------------------------

#[tokio::test]
async fn placeholders_resolve_against_the_event_item_data() {
    let detail = ActivityDetail {
        activity_info: ActivityInfo {
            actions: vec![Action::InAppMessage {
                title: None,
                message: "Hello {{item.name}}, {{item.missing}} stays".into(),
                severity: None,
                duration_ms: None,
            }],
        },
    };
    let backend = MockBackend::new()
        .with_triggers(vec![trigger("trg-1", None)])
        .with_activities(vec![activity("act-1", "welcome")])
        .with_activity_detail("act-1", detail);

    let (engine, _backend, _store) = setup(backend, None);
    let invocation = engine.handle_event(view_event()).await.expect("invocation runs");

    assert_eq!(
        toast_messages(&invocation.effects),
        vec!["Hello Rock Club, {{item.missing}} stays"]
    );
}

#[tokio::test]
async fn activities_fetch_failure_degrades_to_an_empty_run() {
    let backend = MockBackend::new()
        .with_triggers(vec![trigger("trg-1", None)])
        .failing_activities();

    let (engine, backend, _store) = setup(backend, None);
    let invocation = engine.handle_event(view_event()).await.expect("invocation degrades");

    match invocation.outcome {
        InvocationOutcome::Executed { activity_log, .. } => assert!(activity_log.is_empty()),
        other => panic!("expected Executed, got {other:?}"),
    }
    // Degraded, but still audited exactly once.
    assert_eq!(backend.log_count(), 1);
}

#[tokio::test]
async fn missing_activity_detail_counts_as_an_empty_success() {
    // "act-ghost" has no detail configured: the mock answers 404.
    let backend = MockBackend::new()
        .with_triggers(vec![trigger("trg-1", None)])
        .with_activities(vec![activity("act-ghost", "empty")]);

    let (engine, _backend, _store) = setup(backend, None);
    let invocation = engine.handle_event(view_event()).await.expect("invocation runs");

    match invocation.outcome {
        InvocationOutcome::Executed { activity_log, .. } => {
            assert_eq!(activity_log.len(), 1);
            assert!(activity_log[0].success);
            assert!(activity_log[0].action_types.is_empty());
        }
        other => panic!("expected Executed, got {other:?}"),
    }
}

#[tokio::test]
async fn effects_queue_accumulates_and_dismisses() {
    let backend = MockBackend::new()
        .with_triggers(vec![trigger("trg-1", None)])
        .with_activities(vec![activity("act-1", "welcome")])
        .with_activity_detail("act-1", message_detail("hi"));

    let (engine, _backend, _store) = setup(backend, None);
    engine.handle_event(view_event()).await.expect("first invocation");
    engine.handle_event(view_event()).await.expect("second invocation");

    assert_eq!(engine.pending_effects().len(), 2);
    assert!(engine.dismiss(0).is_some());
    assert_eq!(engine.pending_effects().len(), 1);
    engine.dismiss_all();
    assert!(engine.pending_effects().is_empty());
}

#[tokio::test]
async fn form_submission_correlates_back_to_the_trigger() {
    let detail = ActivityDetail {
        activity_info: ActivityInfo {
            actions: vec![Action::ShowForm {
                form_config: json!({ "fields": ["email"] }),
                title: Some("Book {{item.name}}".into()),
            }],
        },
    };
    let backend = MockBackend::new()
        .with_triggers(vec![trigger("trg-1", None)])
        .with_activities(vec![activity("act-1", "signup")])
        .with_activity_detail("act-1", detail);

    let (engine, backend, _store) = setup(backend, None);
    let invocation = engine.handle_event(view_event()).await.expect("invocation runs");

    let correlation = match &invocation.effects[0] {
        InAppEffect::Form { correlation, title, .. } => {
            assert_eq!(title.as_deref(), Some("Book Rock Club"));
            correlation.clone()
        }
        other => panic!("expected form, got {other:?}"),
    };

    let booking_id = engine
        .submit_form(&correlation, json!({ "email": "a@b.c" }))
        .await
        .expect("booking created");
    assert_eq!(booking_id, "booking-1");

    let bookings = backend.bookings.lock().unwrap();
    assert_eq!(bookings[0].workflow_items_id, "wf-1");
    assert_eq!(bookings[0].activity_id, "act-1");
    assert_eq!(bookings[0].items_slug, "rock-climbing-101");
}
