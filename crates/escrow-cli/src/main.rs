//! Command line front-end for escrow payment relays

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use escrow_relay::{EscrowStore, RelayConnector};
use tracing::Level;
use tracing_subscriber::EnvFilter;

mod config;
mod env_vars;
mod renderer;
mod sub_commands;

use crate::config::Settings;

const DEFAULT_WORK_DIR: &str = ".escrow-relay";

/// Pay into escrow contracts through a payment relay
#[derive(Parser)]
#[command(name = "escrow-cli")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to working dir
    #[arg(short, long)]
    work_dir: Option<PathBuf>,
    /// Path to the config file, `<work_dir>/config.toml` if not set
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Logging level
    #[arg(short, long, default_value = "error")]
    log_level: Level,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Relay wallet address
    Address(sub_commands::address::AddressSubCommand),
    /// Pay into an escrow contract and wait for the relay job
    Pay(sub_commands::pay::PaySubCommand),
    /// Status of a relay job
    JobStatus(sub_commands::job_status::JobStatusSubCommand),
    /// Deploy an escrow contract
    Deploy(sub_commands::deploy::DeploySubCommand),
    /// Relay wallet balance
    Balance(sub_commands::balance::BalanceSubCommand),
    /// Stored escrow contract
    Escrow,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Cli = Cli::parse();
    let default_filter = args.log_level;

    let transport_filter = "hyper=warn,reqwest=warn,rustls=warn";

    let env_filter = EnvFilter::new(format!("{},{}", default_filter, transport_filter));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let work_dir = match &args.work_dir {
        Some(work_dir) => work_dir.clone(),
        None => home::home_dir()
            .ok_or_else(|| anyhow!("Could not find home directory"))?
            .join(DEFAULT_WORK_DIR),
    };

    fs::create_dir_all(&work_dir)?;

    let settings = Settings::new(&work_dir, args.config.as_deref())?.from_env()?;
    tracing::debug!("Using relay {} and deploy relay {}", settings.relay.url, settings.deploy.url);

    let store = EscrowStore::in_work_dir(&work_dir);

    match &args.command {
        Commands::Address(sub_command_args) => {
            let relay = settings.relay.client()?;
            sub_commands::address::address(
                &relay,
                settings.relay.contract.as_deref(),
                sub_command_args,
            )
            .await
        }
        Commands::Pay(sub_command_args) => {
            let relay: Arc<dyn RelayConnector + Send + Sync> = Arc::new(settings.relay.client()?);
            sub_commands::pay::pay(
                relay,
                settings.payment_view_config(),
                &store,
                sub_command_args,
            )
            .await
        }
        Commands::JobStatus(sub_command_args) => {
            let relay: Arc<dyn RelayConnector + Send + Sync> = Arc::new(settings.relay.client()?);
            sub_commands::job_status::job_status(relay, settings.poll.policy(), sub_command_args)
                .await
        }
        Commands::Deploy(sub_command_args) => {
            let relay: Arc<dyn RelayConnector + Send + Sync> =
                Arc::new(settings.deploy.client(&settings.relay)?);
            sub_commands::deploy::deploy(
                relay,
                settings.deploy_view_config(),
                &store,
                sub_command_args,
            )
            .await
        }
        Commands::Balance(sub_command_args) => {
            let relay: Arc<dyn RelayConnector + Send + Sync> =
                Arc::new(settings.deploy.client(&settings.relay)?);
            sub_commands::balance::balance(
                relay,
                settings.deploy_view_config(),
                &store,
                sub_command_args,
            )
            .await
        }
        Commands::Escrow => sub_commands::escrow::escrow(&store),
    }
}
