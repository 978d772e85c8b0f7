//! Sync and status commands.

use sarsync::Services;
use serde_json::json;

use crate::output::{OutputFormat, print_json};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Run the `sync` command
pub async fn sync(services: &Services, format: OutputFormat) -> CmdResult {
    let report = services.sync().sync().await?;
    match format {
        OutputFormat::Json => print_json(&json!({
            "pushed": report.pushed,
            "remaining": report.remaining,
        }))?,
        OutputFormat::Human if report.pushed == 0 && report.remaining == 0 => {
            println!("Nothing to sync.")
        }
        OutputFormat::Human => println!(
            "Pushed {} change(s), {} remaining.",
            report.pushed, report.remaining
        ),
    }
    Ok(())
}

/// Run the `status` command: one indicator poll
pub async fn status(services: &Services, format: OutputFormat) -> CmdResult {
    let indicator = services.indicator();
    if indicator.poll_once().await.is_none() {
        return Err("could not read the sync queue".into());
    }
    let status = indicator.status();
    match format {
        OutputFormat::Json => print_json(&json!({
            "online": status.online,
            "pending": status.pending,
            "badge": status.badge().map(|b| b.label()),
        }))?,
        OutputFormat::Human => match status.badge() {
            Some(badge) => println!("{badge}"),
            None => println!("Online, all changes synced"),
        },
    }
    Ok(())
}
