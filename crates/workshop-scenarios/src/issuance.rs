//! Asset issuance: trustlines first, payments second, optional supply lock.
//!
//! Order matters: a trustline must be confirmed before a payment of that
//! asset can succeed, so trustline and payment are always separate
//! transactions with different signers.

use tracing::info;

use workshop_core::{Amount, Asset, Keypair, Network, Operation, PublicKey, Result, TrustAsset};
use workshop_horizon::{HorizonClient, SubmitResponse};

use crate::submit::submit_signed;

/// Open a single trustline, signed by the holding account. A `None` limit
/// means the maximum the ledger allows.
pub async fn establish_trustline(
    horizon: &dyn HorizonClient,
    network: &Network,
    holder: &Keypair,
    line: TrustAsset,
    limit: Option<Amount>,
) -> Result<SubmitResponse> {
    establish_trustlines(horizon, network, holder, vec![(line, limit)]).await
}

/// Open several trustlines in one transaction.
pub async fn establish_trustlines(
    horizon: &dyn HorizonClient,
    network: &Network,
    holder: &Keypair,
    lines: Vec<(TrustAsset, Option<Amount>)>,
) -> Result<SubmitResponse> {
    let count = lines.len();
    let operations = lines
        .into_iter()
        .map(|(line, limit)| Operation::ChangeTrust { line, limit })
        .collect();
    let resp = submit_signed(horizon, network, holder, operations).await?;
    info!(holder = %holder.public_key(), count, hash = %resp.hash, "trustlines established");
    Ok(resp)
}

/// Pay `amount` of `asset` from the issuer to the recipient. When the source
/// is the issuing account this mints new supply.
pub async fn issue_supply(
    horizon: &dyn HorizonClient,
    network: &Network,
    issuer: &Keypair,
    recipient: PublicKey,
    asset: Asset,
    amount: Amount,
) -> Result<SubmitResponse> {
    let resp = send_payments(horizon, network, issuer, vec![(recipient, asset, amount)]).await?;
    info!(asset = %asset, amount = %amount, recipient = %recipient, "supply issued");
    Ok(resp)
}

/// Several payments in one transaction, all from the same source.
pub async fn send_payments(
    horizon: &dyn HorizonClient,
    network: &Network,
    source: &Keypair,
    payments: Vec<(PublicKey, Asset, Amount)>,
) -> Result<SubmitResponse> {
    let operations = payments
        .into_iter()
        .map(|(destination, asset, amount)| Operation::Payment {
            destination,
            asset,
            amount,
        })
        .collect();
    submit_signed(horizon, network, source, operations).await
}

/// Drop the issuer's master signing weight to zero. Irreversible: the account
/// can never sign again, so no further supply can ever be minted.
pub async fn lock_issuer(
    horizon: &dyn HorizonClient,
    network: &Network,
    issuer: &Keypair,
) -> Result<SubmitResponse> {
    let resp = submit_signed(
        horizon,
        network,
        issuer,
        vec![Operation::SetOptions {
            master_weight: Some(0),
            low_threshold: Some(1),
            med_threshold: Some(1),
            high_threshold: Some(1),
        }],
    )
    .await?;
    info!(issuer = %issuer.public_key(), hash = %resp.hash, "issuer locked, supply is now fixed");
    Ok(resp)
}
