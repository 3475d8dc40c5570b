//! `workflow-pulse` CLI entry-point.
//!
//! Available sub-commands:
//! - `fire`           — fire a page/item event and print the effects produced.
//! - `triggers`       — list the triggers registered for a slug.
//! - `validate`       — validate a trigger definition JSON file.
//! - `reset-throttle` — clear the local throttle record for a trigger.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use actions::{EventName, ItemType};
use client::HttpBackend;
use engine::{InvocationOutcome, PageEvent, WorkflowEngine};
use store::{FileStore, ThrottleStore};

#[derive(Parser)]
#[command(
    name = "workflow-pulse",
    about = "Trigger-driven workflow execution engine",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fire a page/item event against the configured backend.
    Fire {
        /// Slug of the item the event happened on.
        #[arg(long)]
        slug: String,
        /// Item type (class, event, raffle, ...).
        #[arg(long)]
        item_type: ItemType,
        /// Event name (view, purchase, register, ...).
        #[arg(long)]
        event: EventName,
        /// Backend id of the item, if known.
        #[arg(long)]
        item_id: Option<String>,
        /// Item data JSON for {{item.<field>}} substitution.
        #[arg(long)]
        data: Option<String>,
        /// Signed-in user id; omit for anonymous.
        #[arg(long, env = "PULSE_USER_ID")]
        user_id: Option<String>,
        #[arg(long, env = "PULSE_BACKEND_URL", default_value = "http://localhost:3000")]
        backend_url: String,
        #[arg(long, env = "PULSE_API_KEY")]
        api_key: Option<String>,
        #[arg(long, env = "PULSE_STATE_DIR", default_value = ".workflow-pulse")]
        state_dir: std::path::PathBuf,
    },
    /// List the triggers registered for a slug.
    Triggers {
        #[arg(long)]
        slug: String,
        #[arg(long, env = "PULSE_BACKEND_URL", default_value = "http://localhost:3000")]
        backend_url: String,
        #[arg(long, env = "PULSE_API_KEY")]
        api_key: Option<String>,
    },
    /// Validate a trigger definition JSON file.
    Validate {
        /// Path to the trigger JSON file.
        path: std::path::PathBuf,
    },
    /// Clear the local throttle record for a trigger.
    ResetThrottle {
        #[arg(long)]
        trigger_id: String,
        #[arg(long, env = "PULSE_STATE_DIR", default_value = ".workflow-pulse")]
        state_dir: std::path::PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Fire {
            slug,
            item_type,
            event,
            item_id,
            data,
            user_id,
            backend_url,
            api_key,
            state_dir,
        } => {
            let item_data = match data {
                Some(raw) => serde_json::from_str(&raw).context("invalid --data JSON")?,
                None => serde_json::Value::Null,
            };

            let backend = HttpBackend::new(backend_url, api_key)
                .context("failed to build backend client")?;
            let store = FileStore::new(state_dir);
            let engine = WorkflowEngine::new(Arc::new(backend), Arc::new(store), user_id);

            info!(%slug, %event, "firing event");
            let invocation = engine
                .handle_event(PageEvent {
                    item_slug: slug,
                    item_id,
                    item_type,
                    trigger_event: event,
                    item_data,
                })
                .await
                .context("invocation failed")?;

            match &invocation.outcome {
                InvocationOutcome::NoTrigger => {
                    println!("No trigger matched; nothing to do.");
                }
                InvocationOutcome::Throttled { reason } => {
                    println!("Trigger throttled ({reason:?}); nothing executed.");
                }
                InvocationOutcome::Executed { log_id, activity_log } => {
                    println!(
                        "✅ Executed {} activities ({} effects). Log id: {}",
                        activity_log.len(),
                        invocation.effects.len(),
                        log_id.as_deref().unwrap_or("<not written>"),
                    );
                    println!("{}", serde_json::to_string_pretty(&invocation.effects)?);
                }
            }
        }

        Command::Triggers { slug, backend_url, api_key } => {
            let backend = HttpBackend::new(backend_url, api_key)
                .context("failed to build backend client")?;
            let triggers = client::WorkflowBackend::triggers_by_slug(&backend, &slug)
                .await
                .context("trigger fetch failed")?;

            if triggers.is_empty() {
                println!("No triggers registered for '{slug}'.");
            }
            for t in triggers {
                let throttled = if t.event_info.throttle.is_some() { " [throttled]" } else { "" };
                println!(
                    "{} seq={} {}:{} -> workflow {}{}",
                    t.id, t.seq, t.items_type, t.event_name, t.workflow_items_id, throttled
                );
            }
        }

        Command::Validate { path } => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("cannot read file {}", path.display()))?;

            match serde_json::from_str::<client::Trigger>(&content) {
                Ok(trigger) => {
                    println!(
                        "✅ Trigger '{}' is valid: fires on {}:{}, workflow {}",
                        trigger.id, trigger.items_type, trigger.event_name, trigger.workflow_items_id
                    );
                    if let Some(throttle) = &trigger.event_info.throttle {
                        println!(
                            "   throttle: enabled={} scope={:?} target={:?} max={:?} cooldown={:?}min version={}",
                            throttle.enabled,
                            throttle.scope,
                            throttle.target,
                            throttle.max_executions,
                            throttle.cooldown_minutes,
                            throttle.version,
                        );
                    }
                }
                Err(e) => {
                    eprintln!("❌ Validation failed: {e}");
                    std::process::exit(1);
                }
            }
        }

        Command::ResetThrottle { trigger_id, state_dir } => {
            let store = FileStore::new(state_dir);
            store.clear(&trigger_id).await;
            println!("✅ Local throttle record for '{trigger_id}' cleared.");
        }
    }

    Ok(())
}
