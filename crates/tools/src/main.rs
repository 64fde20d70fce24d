//! Maintenance CLI for the project-management database.
//!
//! Every subcommand is safe to re-run. Commands that write require an
//! explicit `--apply`.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;

use cli::Cli;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "gestion_tools=info,gestion_db=warn",
        1 => "gestion_tools=debug,gestion_db=debug",
        _ => "gestion_tools=trace,gestion_db=trace,gestion_core=trace,sqlx=debug",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = cli.run().await {
        tracing::error!("Command failed: {err:#}");
        std::process::exit(1);
    }
}
