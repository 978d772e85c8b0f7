//! Offline data commands: put, get, delete, queue.

use sarsync::{MutationOp, Services, UpdateOutcome};
use serde_json::{Value, json};

use crate::cli::{KeyArgs, PutArgs};
use crate::output::{OutputFormat, print_json, print_table};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Run the `put` command through an offline binding
pub async fn put(services: &Services, args: &PutArgs, format: OutputFormat) -> CmdResult {
    let value: Value = serde_json::from_str(&args.value)?;
    let binding = services.binding(args.key.clone(), Value::Null);
    binding.activate().await;

    let outcome = binding.update(value).await;
    let status = match &outcome {
        UpdateOutcome::Synced => "synced",
        UpdateOutcome::Queued => "queued",
        UpdateOutcome::SyncFailed(_) => "saved, sync failed",
        UpdateOutcome::PersistFailed(_) => "not saved",
    };

    match format {
        OutputFormat::Json => print_json(&json!({
            "key": args.key,
            "persisted": outcome.is_persisted(),
            "synced": binding.is_synced(),
        }))?,
        OutputFormat::Human => println!("{}: {status}", args.key),
    }

    match outcome {
        UpdateOutcome::PersistFailed(message) => Err(message.into()),
        _ => Ok(()),
    }
}

/// Run the `get` command
pub async fn get(services: &Services, args: &KeyArgs, format: OutputFormat) -> CmdResult {
    let value = services.store().get(&args.key).await?;
    match (format, value) {
        (OutputFormat::Json, value) => print_json(&json!({ "key": args.key, "value": value }))?,
        (OutputFormat::Human, Some(value)) => println!("{}", serde_json::to_string_pretty(&value)?),
        (OutputFormat::Human, None) => println!("{}: not found", args.key),
    }
    Ok(())
}

/// Run the `delete` command
pub async fn delete(services: &Services, args: &KeyArgs, format: OutputFormat) -> CmdResult {
    let existed = services.store().get(&args.key).await?.is_some();
    services.store().delete(&args.key).await?;
    match format {
        OutputFormat::Json => print_json(&json!({ "key": args.key, "deleted": existed }))?,
        OutputFormat::Human if existed => println!("{}: deleted", args.key),
        OutputFormat::Human => println!("{}: not found", args.key),
    }
    Ok(())
}

/// Run the `queue` command
pub async fn queue(services: &Services, format: OutputFormat) -> CmdResult {
    let queue = services.store().get_sync_queue().await?;
    match format {
        OutputFormat::Json => print_json(&serde_json::to_value(&queue)?)?,
        OutputFormat::Human => {
            if queue.is_empty() {
                println!("No pending changes.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = queue
                .iter()
                .map(|m| {
                    let op = match &m.op {
                        MutationOp::Upsert { .. } => "upsert",
                        MutationOp::Delete => "delete",
                    };
                    vec![
                        m.id.to_string(),
                        op.to_string(),
                        m.key.clone(),
                        m.queued_at.to_rfc3339(),
                    ]
                })
                .collect();
            print_table(&["ID", "OP", "KEY", "QUEUED AT"], &rows);
        }
    }
    Ok(())
}
