//! Execution contexts passed to the interpreter.
//!
//! Defined here (in the actions crate) so both the engine and the backend
//! client can import them without a circular dependency.

use serde::{Deserialize, Serialize};

use crate::model::ItemType;

/// The item the current invocation is running against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemContext {
    /// Slug the triggering page/item is addressed by.
    pub slug: String,
    /// Backend id of the item, when the caller knows it.
    #[serde(default)]
    pub id: Option<String>,
    pub item_type: ItemType,
    /// Arbitrary item fields used for `{{item.<field>}}` substitution.
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Which workflow/activity an action is being executed for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowContext {
    pub workflow_items_id: String,
    pub activity_id: String,
}
