//! Deploying a classic asset's token contract to the contract environment.

use tracing::info;

use workshop_core::{
    Asset, ContractId, Keypair, Network, Operation, PollConfig, Result, TransactionBuilder,
};
use workshop_horizon::HorizonClient;
use workshop_soroban::{confirm_transaction, SorobanClient};

/// Deploy the built-in token contract for `asset`. The contract address is a
/// deterministic function of the network and the asset, so it is known (and
/// logged) before the transaction is submitted. The submission is prepared
/// (simulated) by the RPC, signed, sent, and polled to finality.
pub async fn deploy_asset_contract(
    horizon: &dyn HorizonClient,
    soroban: &dyn SorobanClient,
    network: &Network,
    poll: &PollConfig,
    source: &Keypair,
    asset: Asset,
) -> Result<ContractId> {
    let contract_id = ContractId::for_asset(network, &asset);
    info!(asset = %asset, contract_id = %contract_id, "predicted contract address");

    let account = horizon.load_account(&source.public_key()).await?;
    let tx = TransactionBuilder::new(source.public_key(), account.sequence)
        .add_operation(Operation::CreateAssetContract { asset })
        .build()?;

    let prepared = soroban.prepare_transaction(&tx).await?;
    let signed = prepared.sign(network, &[source]);
    let hash = soroban.send_transaction(&signed).await?;
    info!(hash = %hash, "deploy transaction submitted");

    confirm_transaction(soroban, &hash, poll).await?;
    info!(asset = %asset, contract_id = %contract_id, "asset contract deployed");
    Ok(contract_id)
}
