//! busysync - calendar busy-slot reconciliation daemon
//!
//! Main entry point for the command-line application.

use anyhow::{Context, Result};
use busysync_app::cli::{Cli, Command};
use busysync_app::{lifecycle, logging, AppContext};
use busysync_infra::config;
use chrono::Utc;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Must happen before config loading so `.env` can supply BUSYSYNC_* overrides.
    let dotenv = dotenvy::dotenv();

    let config_path =
        config::resolve_config_path(cli.config.clone()).context("failed to locate configuration")?;
    let config =
        config::load(Some(config_path.clone())).context("failed to load configuration")?;
    logging::init(&config.logging)?;
    tracing::info!(path = %config_path.display(), "Loaded configuration");

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(err) if err.not_found() => {}
        Err(err) => tracing::warn!(error = %err, "could not load .env file"),
    }

    let ctx = AppContext::new(config)?;

    let command = cli.selected();
    let _lock = lifecycle::lock_for(&ctx, command, &cli.lock_dir())?;

    match command {
        Command::Run => lifecycle::run_daemon(&ctx).await?,
        Command::Once => {
            let report = lifecycle::run_once(&ctx, Utc::now()).await?;
            println!(
                "created {}, deleted {} ({} already gone), unchanged {}",
                report.created, report.deleted, report.already_gone, report.unchanged
            );
        }
        Command::Collapse { days } => {
            let summary = lifecycle::collapse(&ctx, Utc::now(), days).await?;
            println!("deleted {} duplicates in {} passes", summary.deleted, summary.passes);
        }
        Command::Plan => {
            let plan = lifecycle::plan(&ctx, Utc::now()).await?;
            print!("{}", lifecycle::render_plan(&plan));
        }
    }

    Ok(())
}
