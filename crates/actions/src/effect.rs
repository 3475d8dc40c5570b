//! In-app effects — the queued UI artifacts produced by executing actions.

use serde::{Deserialize, Serialize};

use crate::model::{ItemType, ModalButton, Severity};

/// Ties a form effect back to the trigger/activity that produced it, so a
/// later submission can be correlated into a booking record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormCorrelation {
    pub workflow_items_id: String,
    pub activity_id: String,
    #[serde(default)]
    pub item_id: Option<String>,
    pub item_slug: String,
    pub item_type: ItemType,
}

/// A renderable artifact awaiting display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InAppEffect {
    Toast {
        #[serde(default)]
        title: Option<String>,
        message: String,
        severity: Severity,
        duration_ms: u64,
    },
    /// Manually dismissed, so no duration.
    Modal {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        message: Option<String>,
        buttons: Vec<ModalButton>,
    },
    /// Manually dismissed; carries the raw form configuration untouched.
    Form {
        #[serde(default)]
        title: Option<String>,
        form_config: serde_json::Value,
        correlation: FormCorrelation,
    },
}

impl InAppEffect {
    /// How long the effect should stay on screen; `0` means until dismissed.
    pub fn duration_ms(&self) -> u64 {
        match self {
            Self::Toast { duration_ms, .. } => *duration_ms,
            Self::Modal { .. } | Self::Form { .. } => 0,
        }
    }
}
