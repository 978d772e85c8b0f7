use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod context;
mod output;

use cli::{Cli, Commands};
use output::OutputFormat;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sarsync=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let format = OutputFormat::from_flag(cli.json);
    let services = context::open_services(&cli.context).await?;

    match &cli.command {
        Commands::Session(command) => commands::session::run(&services, command, format),
        Commands::Put(args) => commands::data::put(&services, args, format).await,
        Commands::Get(args) => commands::data::get(&services, args, format).await,
        Commands::Delete(args) => commands::data::delete(&services, args, format).await,
        Commands::Queue => commands::data::queue(&services, format).await,
        Commands::Sync => {
            if cli.context.remote_url.is_none() {
                return Err("sync needs --remote-url or SARSYNC_REMOTE_URL".into());
            }
            if cli.context.offline {
                return Err("sync is disabled while --offline is set".into());
            }
            commands::sync::sync(&services, format).await
        }
        Commands::Status => commands::sync::status(&services, format).await,
    }
}
