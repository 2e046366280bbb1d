use anyhow::Result;
use escrow_relay::EscrowStore;

pub fn escrow(store: &EscrowStore) -> Result<()> {
    match store.get() {
        Some(contract) => println!("{contract}"),
        None => println!("No escrow contract deployed"),
    }

    Ok(())
}
