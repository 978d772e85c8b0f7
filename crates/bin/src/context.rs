//! Service construction from CLI arguments.

use std::path::PathBuf;
use std::sync::Arc;

use sarsync::{
    Config, FileStorage, InMemory, Navigator, Platform, Services, SyncConfig,
    constants::{SESSION_DIR, STORE_FILE},
    sync::HttpRemote,
};

use crate::cli::ContextArgs;

/// Stands in for page navigation: redirect targets are logged and printed.
#[derive(Debug, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn redirect(&self, to: &str) {
        tracing::info!(to, "Redirect requested");
        eprintln!("-> {to}");
    }
}

/// Build the services rooted at the configured data directory.
pub async fn open_services(args: &ContextArgs) -> Result<Services, Box<dyn std::error::Error>> {
    let data_dir = args.data_dir.clone().unwrap_or_else(|| PathBuf::from("."));

    // Ensure data directory exists
    tokio::fs::create_dir_all(&data_dir).await?;

    let storage = FileStorage::open(data_dir.join(SESSION_DIR))?;
    let store = InMemory::open(data_dir.join(STORE_FILE)).await?;
    let platform = Platform::new(Arc::new(storage), Arc::new(LogNavigator));

    let online = !args.offline && args.remote_url.is_some();
    let config = Config::default().with_sync(SyncConfig::default().with_start_online(online));

    let mut builder = Services::builder()
        .platform(platform)
        .store(Arc::new(store))
        .config(config);

    if let Some(url) = &args.remote_url {
        let mut remote = HttpRemote::new(url)?;
        if let Some(token) = &args.remote_token {
            remote = remote.with_bearer_token(token.clone());
        }
        tracing::info!("Using remote at {}", remote.endpoint());
        builder = builder.remote(Arc::new(remote));
    }

    Ok(builder.build())
}
