use workshop_core::{Keypair, Network, Operation, Result, TransactionBuilder};
use workshop_horizon::{HorizonClient, SubmitResponse};

/// Load the signer's account for a fresh sequence number, build a
/// transaction from the given operations, sign it and submit it. Every
/// classic-ledger step follows this shape.
pub async fn submit_signed(
    horizon: &dyn HorizonClient,
    network: &Network,
    signer: &Keypair,
    operations: Vec<Operation>,
) -> Result<SubmitResponse> {
    let account = horizon.load_account(&signer.public_key()).await?;
    let mut builder = TransactionBuilder::new(signer.public_key(), account.sequence);
    for op in operations {
        builder = builder.add_operation(op);
    }
    let tx = builder.build()?;
    let signed = tx.sign(network, &[signer]);
    horizon.submit_transaction(&signed).await
}
