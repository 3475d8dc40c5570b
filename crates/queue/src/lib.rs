//! `queue` crate — the pending in-app effect queue.
//!
//! Effects produced by an invocation wait here until the UI displays and
//! dismisses them.  Shared behind the engine, so interior mutability.

use std::sync::Mutex;

use tracing::debug;

use actions::InAppEffect;

/// FIFO of effects awaiting display.
#[derive(Debug, Default)]
pub struct EffectQueue {
    pending: Mutex<Vec<InAppEffect>>,
}

impl EffectQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append effects in order; called once per invocation.
    pub fn push_all(&self, effects: impl IntoIterator<Item = InAppEffect>) {
        let mut pending = self.pending.lock().unwrap();
        pending.extend(effects);
        debug!(pending = pending.len(), "effects queued");
    }

    /// Snapshot of everything currently pending, in queue order.
    pub fn snapshot(&self) -> Vec<InAppEffect> {
        self.pending.lock().unwrap().clone()
    }

    /// Remove and return the effect at `index`; `None` if out of range.
    pub fn dismiss(&self, index: usize) -> Option<InAppEffect> {
        let mut pending = self.pending.lock().unwrap();
        if index < pending.len() {
            Some(pending.remove(index))
        } else {
            None
        }
    }

    pub fn dismiss_all(&self) {
        self.pending.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().unwrap().is_empty()
    }
}
