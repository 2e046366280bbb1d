use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use escrow_relay::view::DeployViewConfig;
use escrow_relay::{DeployView, EscrowStore, RelayConnector};

#[derive(Args)]
pub struct DeploySubCommand {
    /// Amount held by the escrow contract
    #[arg(short, long)]
    amount: String,
}

pub async fn deploy(
    connector: Arc<dyn RelayConnector + Send + Sync>,
    config: DeployViewConfig,
    store: &EscrowStore,
    sub_command_args: &DeploySubCommand,
) -> Result<()> {
    let view = DeployView::new(connector, config, store.clone());

    match view.deploy(&sub_command_args.amount).await {
        Ok(contract) => {
            println!("Escrow contract: {contract}");
            println!("Balance: {}", view.state().balance);
            Ok(())
        }
        Err(err) => {
            if let Some(banner) = view.state().banner {
                eprintln!("{banner}");
            }
            Err(err.into())
        }
    }
}
