//! Trigger resolution — which automation rule, if any, applies to an event.

use std::sync::Arc;

use tracing::debug;

use actions::{EventName, ItemType};
use client::{Trigger, WorkflowBackend};

use crate::error::EngineError;

/// Finds the single trigger applicable to a slug + type + event.
pub struct TriggerResolver {
    backend: Arc<dyn WorkflowBackend>,
}

impl TriggerResolver {
    pub fn new(backend: Arc<dyn WorkflowBackend>) -> Self {
        Self { backend }
    }

    /// Fetch the slug's triggers, keep exact type+event matches, and return
    /// the lowest-sequence one.  `None` means the invocation is a silent
    /// no-op and must not be logged.
    ///
    /// # Errors
    /// A failed trigger fetch propagates; there is no trigger list to
    /// degrade to at this point.
    pub async fn resolve(
        &self,
        item_slug: &str,
        item_type: ItemType,
        event_name: EventName,
    ) -> Result<Option<Trigger>, EngineError> {
        let candidates = self.backend.triggers_by_slug(item_slug).await?;
        if candidates.is_empty() {
            debug!(item_slug, "no triggers registered for slug");
            return Ok(None);
        }

        let mut matches: Vec<Trigger> = candidates
            .into_iter()
            .filter(|t| t.items_type == item_type && t.event_name == event_name)
            .collect();

        if matches.is_empty() {
            debug!(item_slug, %item_type, %event_name, "no trigger matches type+event");
            return Ok(None);
        }

        matches.sort_by_key(|t| t.seq);
        let winner = matches.into_iter().next();
        if let Some(t) = &winner {
            debug!(trigger_id = %t.id, seq = t.seq, "trigger resolved");
        }
        Ok(winner)
    }
}
