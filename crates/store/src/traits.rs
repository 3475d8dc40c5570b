//! The `ThrottleStore` trait — the contract every record store must fulfil.

use async_trait::async_trait;

use crate::record::ThrottleRecord;

/// Keyed storage of throttle records.
///
/// Implementations never propagate errors: a read that fails for any
/// reason answers `None` (fail open) and a write that fails does so
/// silently.  The device-local store is best-effort by contract — a
/// corrupted cache entry must not permanently block a user.
#[async_trait]
pub trait ThrottleStore: Send + Sync {
    async fn read(&self, trigger_id: &str) -> Option<ThrottleRecord>;

    async fn write(&self, trigger_id: &str, record: &ThrottleRecord);

    /// Drop any record held for the trigger.
    async fn clear(&self, trigger_id: &str);
}
