use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use escrow_relay::view::PaymentViewConfig;
use escrow_relay::{EscrowStore, PaymentView, PollOutcome, RelayConnector};

use crate::renderer::TerminalRenderer;

#[derive(Args)]
pub struct PaySubCommand {
    /// Escrow contract or partial address, stored escrow contract if not set
    #[arg(short, long)]
    destination: Option<String>,
    /// Amount to pay
    #[arg(short, long)]
    amount: String,
}

pub async fn pay(
    connector: Arc<dyn RelayConnector + Send + Sync>,
    config: PaymentViewConfig,
    store: &EscrowStore,
    sub_command_args: &PaySubCommand,
) -> Result<()> {
    let view = PaymentView::new(connector, config, Arc::new(TerminalRenderer));
    view.watch_store(store);
    view.init().await?;

    let submit = view.submit(sub_command_args.destination.as_deref(), &sub_command_args.amount);
    tokio::pin!(submit);

    let outcome = tokio::select! {
        outcome = &mut submit => outcome,
        _ = tokio::signal::ctrl_c() => {
            view.cancel();
            submit.await
        }
    };

    view.shutdown();

    match outcome? {
        PollOutcome::Completed { attempts } => {
            tracing::debug!("Job completed after {} status checks", attempts);
        }
        PollOutcome::Cancelled { .. } => println!("Cancelled"),
    }

    Ok(())
}
