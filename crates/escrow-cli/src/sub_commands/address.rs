use anyhow::Result;
use clap::Args;
use escrow_relay::RelayConnector;

#[derive(Args)]
pub struct AddressSubCommand {
    /// Escrow contract, relay default if not set
    #[arg(short, long)]
    contract: Option<String>,
}

pub async fn address<C>(
    connector: &C,
    default_contract: Option<&str>,
    sub_command_args: &AddressSubCommand,
) -> Result<()>
where
    C: RelayConnector + ?Sized,
{
    let contract = sub_command_args.contract.as_deref().or(default_contract);

    let address = connector.get_address(contract).await?;

    println!("{address}");

    Ok(())
}
