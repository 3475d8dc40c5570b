//! The persisted per-trigger throttle counter.

use serde::{Deserialize, Serialize};

/// Execution counter for one (trigger, storage backend) pair.
///
/// A record is only meaningful while its `version` is current and its
/// window start postdates the config's `reset_at`; the evaluator discards
/// it otherwise.  Mutated by the throttle evaluator only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleRecord {
    pub count: u32,
    /// Epoch-ms start of the current scope window.
    pub first_execution: i64,
    /// Epoch-ms of the most recent recorded execution.
    pub last_execution: i64,
    /// Config version this record was built under.
    pub version: u32,
}

impl ThrottleRecord {
    /// A record for the first execution of a fresh window.
    pub fn fresh(now_ms: i64, version: u32) -> Self {
        Self {
            count: 1,
            first_execution: now_ms,
            last_execution: now_ms,
            version,
        }
    }

    /// This record with one more execution counted.
    pub fn incremented(&self, now_ms: i64) -> Self {
        Self {
            count: self.count.saturating_add(1),
            first_execution: self.first_execution,
            last_execution: now_ms,
            version: self.version,
        }
    }
}
