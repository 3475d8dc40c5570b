//! The action interpreter — a pure mapping from action descriptors to
//! in-app effects.

use tracing::debug;

use crate::context::{ItemContext, WorkflowContext};
use crate::effect::{FormCorrelation, InAppEffect};
use crate::model::{Action, ModalButton};

/// Default on-screen time for a toast when the action does not set one.
pub const DEFAULT_TOAST_DURATION_MS: u64 = 5_000;

/// Resolve `{{item.<key>}}` placeholders in `template` against the item's
/// data object.
///
/// This is literal per-key string replacement, not templating: values are
/// spliced in unescaped, and an unmatched placeholder is left verbatim.
/// Item data whose values themselves contain `{{item.<key>}}` syntax will
/// be substituted again on a later pass over the same string; callers must
/// treat item data as trusted.
pub fn substitute_placeholders(template: &str, data: &serde_json::Value) -> String {
    let Some(fields) = data.as_object() else {
        return template.to_owned();
    };

    let mut out = template.to_owned();
    for (key, value) in fields {
        let needle = format!("{{{{item.{key}}}}}");
        if !out.contains(&needle) {
            continue;
        }
        let replacement = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        out = out.replace(&needle, &replacement);
    }
    out
}

fn substitute_opt(template: &Option<String>, data: &serde_json::Value) -> Option<String> {
    template.as_ref().map(|t| substitute_placeholders(t, data))
}

/// Map one action to its renderable effect.
///
/// Unknown action types produce no effect and no error.
pub fn interpret(
    action: &Action,
    item: &ItemContext,
    workflow: &WorkflowContext,
) -> Option<InAppEffect> {
    match action {
        Action::InAppMessage { title, message, severity, duration_ms } => {
            Some(InAppEffect::Toast {
                title: substitute_opt(title, &item.data),
                message: substitute_placeholders(message, &item.data),
                severity: severity.unwrap_or_default(),
                duration_ms: duration_ms.unwrap_or(DEFAULT_TOAST_DURATION_MS),
            })
        }

        Action::ShowModal { title, message, buttons } => Some(InAppEffect::Modal {
            title: substitute_opt(title, &item.data),
            message: substitute_opt(message, &item.data),
            buttons: buttons
                .iter()
                .map(|b| ModalButton {
                    id: b.id.clone(),
                    text: substitute_placeholders(&b.text, &item.data),
                    value: b.value.clone(),
                    color: b.color.clone(),
                })
                .collect(),
        }),

        // Only the title is templated; the form configuration is opaque to
        // this subsystem and passes through unmodified.
        Action::ShowForm { form_config, title } => Some(InAppEffect::Form {
            title: substitute_opt(title, &item.data),
            form_config: form_config.clone(),
            correlation: FormCorrelation {
                workflow_items_id: workflow.workflow_items_id.clone(),
                activity_id: workflow.activity_id.clone(),
                item_id: item.id.clone(),
                item_slug: item.slug.clone(),
                item_type: item.item_type,
            },
        }),

        Action::Unknown => {
            debug!("skipping action with unknown type");
            None
        }
    }
}
