mod run;
mod schedule;
mod wiring;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::run::{run_batch, RunOptions};

#[derive(Debug, Parser)]
#[command(name = "growthwatch")]
#[command(about = "Company growth intelligence collector")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Process every configured company once
    Run {
        /// Only process the company with this name
        #[arg(long)]
        company: Option<String>,
        /// Do not wait between companies
        #[arg(long)]
        no_pacing: bool,
        /// Write JSON records but do not push to the CRM
        #[arg(long)]
        skip_crm: bool,
    },
    /// Run the batch on the configured cron schedule until interrupted
    Schedule,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Arc::new(growthwatch_core::load_app_config_from_env()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Run {
            company,
            no_pacing,
            skip_crm,
        } => {
            let options = RunOptions {
                company,
                no_pacing,
                skip_crm,
            };
            let outcome = run_batch(&config, &options).await?;
            tracing::info!(
                run_id = %outcome.run_id,
                total = outcome.total(),
                succeeded = outcome.succeeded,
                partial = outcome.partial,
                skipped = outcome.skipped,
                "run complete"
            );
            if !outcome.is_success() {
                anyhow::bail!("all {} companies were skipped", outcome.total());
            }
        }
        Commands::Schedule => {
            let mut scheduler = schedule::build_scheduler(Arc::clone(&config)).await?;
            tokio::signal::ctrl_c().await?;
            tracing::info!("received shutdown signal, stopping scheduler");
            scheduler.shutdown().await?;
        }
    }

    Ok(())
}
