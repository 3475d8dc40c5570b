//! The invocation state machine.
//!
//! Phases an invocation moves through, the legal transitions between them,
//! and a shared tracker the UI can poll for progress.  Encoding the
//! transitions explicitly makes the short-circuit exits (no trigger /
//! throttled) and the always-reaches-logging guarantee testable on their
//! own, away from any network I/O.

use std::sync::Mutex;

use serde::Serialize;
use thiserror::Error;

/// Where an invocation currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    ResolvingTrigger,
    CheckingThrottle,
    FetchingActivities,
    ExecutingActivities,
    Logging,
    Complete,
}

impl Phase {
    /// Whether `next` is a legal successor of `self`.
    ///
    /// Short-circuit exits back to `Idle` are legal from
    /// `ResolvingTrigger` (no trigger found, or the fetch failed) and
    /// `CheckingThrottle` (denied, or the authoritative check failed).
    /// Past the throttle gate the only way forward is through `Logging`.
    pub fn can_transition(self, next: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, next),
            (Idle, ResolvingTrigger)
                | (ResolvingTrigger, CheckingThrottle)
                | (ResolvingTrigger, Idle)
                | (CheckingThrottle, FetchingActivities)
                | (CheckingThrottle, Idle)
                | (FetchingActivities, ExecutingActivities)
                | (ExecutingActivities, Logging)
                | (Logging, Complete)
                | (Complete, Idle)
        )
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::ResolvingTrigger => "resolving_trigger",
            Self::CheckingThrottle => "checking_throttle",
            Self::FetchingActivities => "fetching_activities",
            Self::ExecutingActivities => "executing_activities",
            Self::Logging => "logging",
            Self::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

/// Attempted transition that the machine does not allow.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("illegal phase transition: {from} -> {to}")]
pub struct TransitionError {
    pub from: Phase,
    pub to: Phase,
}

/// Shared, observable phase of the engine's current invocation.
#[derive(Debug)]
pub struct PhaseTracker {
    current: Mutex<Phase>,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self { current: Mutex::new(Phase::Idle) }
    }

    pub fn current(&self) -> Phase {
        *self.current.lock().unwrap()
    }

    /// Move to `next`, enforcing transition legality.
    pub fn advance(&self, next: Phase) -> Result<(), TransitionError> {
        let mut current = self.current.lock().unwrap();
        if !current.can_transition(next) {
            return Err(TransitionError { from: *current, to: next });
        }
        *current = next;
        Ok(())
    }
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}
