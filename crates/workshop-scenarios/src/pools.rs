//! Liquidity provisioning on the classic ledger.

use tracing::info;

use workshop_core::{
    Amount, Asset, Keypair, Network, Operation, PoolParameters, PriceBand, Result, TrustAsset,
    WorkshopError,
};
use workshop_horizon::{HorizonClient, SubmitResponse};

use crate::issuance::establish_trustline;
use crate::submit::submit_signed;

/// Open the pool-share trustline a deposit requires.
pub async fn establish_pool_trustline(
    horizon: &dyn HorizonClient,
    network: &Network,
    holder: &Keypair,
    params: PoolParameters,
) -> Result<SubmitResponse> {
    establish_trustline(horizon, network, holder, TrustAsset::PoolShare(params), None).await
}

/// Deposit paired liquidity. `deposits` names each asset with its maximum
/// amount in either order; the amounts are aligned to the pool's canonical
/// asset order before the operation is built. The ledger deposits actual
/// amounts within `band` of the pool's current price and may use less than
/// the maxima.
pub async fn deposit_liquidity(
    horizon: &dyn HorizonClient,
    network: &Network,
    depositor: &Keypair,
    params: PoolParameters,
    deposits: [(Asset, Amount); 2],
    band: PriceBand,
) -> Result<SubmitResponse> {
    let (max_amount_a, max_amount_b) = aligned_amounts(&params, &deposits)?;
    let resp = submit_signed(
        horizon,
        network,
        depositor,
        vec![Operation::LiquidityPoolDeposit {
            pool_id: params.id(),
            max_amount_a,
            max_amount_b,
            min_price: band.min,
            max_price: band.max,
        }],
    )
    .await?;
    info!(
        pool = %params.id(),
        max_a = %max_amount_a,
        max_b = %max_amount_b,
        hash = %resp.hash,
        "liquidity deposited"
    );
    Ok(resp)
}

/// Map caller-order (asset, amount) pairs onto the pool's canonical slots.
fn aligned_amounts(
    params: &PoolParameters,
    deposits: &[(Asset, Amount); 2],
) -> Result<(Amount, Amount)> {
    let find = |asset: Asset| {
        deposits
            .iter()
            .find(|(a, _)| *a == asset)
            .map(|(_, amount)| *amount)
            .ok_or_else(|| {
                WorkshopError::InvalidAsset(format!("deposit is missing an amount for {asset}"))
            })
    };
    Ok((find(params.asset_a())?, find(params.asset_b())?))
}
