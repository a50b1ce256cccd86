//! Full asset lifecycle on the classic ledger: wallets, a custom token,
//! a locked supply, a liquidity pool and a path-payment swap.

use workshop_core::{
    Amount, Asset, Operation, PoolParameters, PriceBand, Result, TrustAsset, WorkshopConfig,
    LIQUIDITY_POOL_FEE_BPS,
};
use workshop_horizon::HorizonClient;

use crate::issuance::{establish_trustline, issue_supply, lock_issuer};
use crate::pools::{deposit_liquidity, establish_pool_trustline};
use crate::report::Reporter;
use crate::submit::submit_signed;
use crate::wallets::provision_wallet;

const TOKEN_CODE: &str = "RIO";
const TOKEN_SUPPLY_UNITS: i64 = 1_000_000;
const POOL_NATIVE_UNITS: i64 = 1_000;
const POOL_TOKEN_UNITS: i64 = 500_000;
const TRADER_TRUST_LIMIT_UNITS: i64 = 1_000_000_000;
const SWAP_NATIVE_UNITS: i64 = 100;

pub async fn run(horizon: &dyn HorizonClient, config: &WorkshopConfig) -> Result<()> {
    let network = &config.network;
    let mut report = Reporter::new();

    report.step("Creating wallets");
    let issuer = provision_wallet(horizon, "asset creator").await?;
    let holder = provision_wallet(horizon, "token holder").await?;
    let trader = provision_wallet(horizon, "trader").await?;
    report.balances("asset creator", &issuer.account);
    report.balances("token holder", &holder.account);
    report.balances("trader", &trader.account);

    report.step("Creating custom asset");
    let token = Asset::new(TOKEN_CODE, issuer.public_key())?;
    report.detail("asset", &token);

    report.step("Creating trustline for the token");
    establish_trustline(
        horizon,
        network,
        &holder.keypair,
        TrustAsset::Asset(token),
        None,
    )
    .await?;

    report.step("Issuing tokens");
    let supply = Amount::from_units(TOKEN_SUPPLY_UNITS)?;
    issue_supply(
        horizon,
        network,
        &issuer.keypair,
        holder.public_key(),
        token,
        supply,
    )
    .await?;

    report.step("Removing minting ability");
    lock_issuer(horizon, network, &issuer.keypair).await?;
    let holder_account = horizon.load_account(&holder.public_key()).await?;
    report.balances("token holder", &holder_account);

    report.step("Creating liquidity pool");
    let pool = PoolParameters::new(Asset::native(), token, LIQUIDITY_POOL_FEE_BPS)?;
    report.detail("pool id", &pool.id());
    establish_pool_trustline(horizon, network, &holder.keypair, pool).await?;

    report.step("Depositing liquidity");
    deposit_liquidity(
        horizon,
        network,
        &holder.keypair,
        pool,
        [
            (Asset::native(), Amount::from_units(POOL_NATIVE_UNITS)?),
            (token, Amount::from_units(POOL_TOKEN_UNITS)?),
        ],
        PriceBand::default(),
    )
    .await?;
    let holder_account = horizon.load_account(&holder.public_key()).await?;
    report.balances("token holder", &holder_account);

    report.step("Trader swaps lumens for the token");
    establish_trustline(
        horizon,
        network,
        &trader.keypair,
        TrustAsset::Asset(token),
        Some(Amount::from_units(TRADER_TRUST_LIMIT_UNITS)?),
    )
    .await?;
    submit_signed(
        horizon,
        network,
        &trader.keypair,
        vec![Operation::PathPaymentStrictSend {
            send_asset: Asset::native(),
            send_amount: Amount::from_units(SWAP_NATIVE_UNITS)?,
            destination: trader.public_key(),
            dest_asset: token,
            // Very low floor: the demo accepts whatever the pool prices.
            dest_min: Amount::from_units(1)?,
            path: vec![],
        }],
    )
    .await?;

    report.step("Final results");
    let trader_account = horizon.load_account(&trader.public_key()).await?;
    report.balances("trader", &trader_account);

    report.summary(&[
        ("asset", token.to_string()),
        ("pool id", pool.id().to_string()),
        ("token holder", holder.public_key().to_string()),
        ("trader", trader.public_key().to_string()),
    ]);
    Ok(())
}
