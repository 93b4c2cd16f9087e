//! # Leads Hunter Entry Point
//!
//! `serve` (the default) runs the HTTP API; `migrate` applies the schema;
//! `seed` creates the platform admin.

use anyhow::Context;
use clap::{Parser, Subcommand};

use leadshunter::{
    accounts::AccountService, config::ConfigLoader, db, seeds, server::run_server, telemetry,
};

#[derive(Debug, Parser)]
#[command(name = "leadshunter", version, about = "Lead prospecting and per-seat billing service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply migrations, seed the admin and serve the API
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Create the platform admin from the bootstrap settings and exit
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::new()
        .load()
        .context("Failed to load configuration")?;
    telemetry::init_tracing(&config)?;

    match config.redacted_json() {
        Ok(redacted) => tracing::info!(profile = %config.profile, config = %redacted, "Loaded configuration"),
        Err(err) => tracing::warn!(error = %err, "Could not render configuration"),
    }

    let db = db::init_pool(&config).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Migrate => db::run_migrations(&db).await,
        Command::Seed => {
            db::run_migrations(&db).await?;
            let accounts = AccountService::new(db, config.billing.clone());
            seeds::seed_admin(&accounts, &config.bootstrap).await?;
            Ok(())
        }
        Command::Serve => {
            db::run_migrations(&db).await?;
            let accounts = AccountService::new(db.clone(), config.billing.clone());
            seeds::seed_admin(&accounts, &config.bootstrap).await?;
            run_server(config, db).await
        }
    }
}
