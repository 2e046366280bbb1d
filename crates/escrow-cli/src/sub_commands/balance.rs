use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use escrow_relay::view::DeployViewConfig;
use escrow_relay::{DeployView, EscrowStore, RelayConnector};

#[derive(Args)]
pub struct BalanceSubCommand {
    /// Keep printing the balance until interrupted
    #[arg(short, long)]
    watch: bool,
}

pub async fn balance(
    connector: Arc<dyn RelayConnector + Send + Sync>,
    config: DeployViewConfig,
    store: &EscrowStore,
    sub_command_args: &BalanceSubCommand,
) -> Result<()> {
    let view = DeployView::new(connector, config, store.clone());

    if !sub_command_args.watch {
        let balance = view.refresh_balance().await?;
        println!("{balance}");
        return Ok(());
    }

    let mut changes = view.subscribe();
    view.start().await;

    let mut last = None;
    loop {
        let state = changes.borrow_and_update().clone();
        let line = match &state.banner {
            Some(banner) => format!("Balance: {} ({})", state.balance, banner),
            None => format!("Balance: {}", state.balance),
        };

        if last.as_ref() != Some(&line) {
            println!("{line}");
            last = Some(line);
        }

        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    view.stop();

    Ok(())
}
