//! Issue a token, deploy it to the contract environment and trade it through
//! the aggregator. Without an aggregator API key the trading phases run
//! quote-only and are reported as simulated, never as confirmed.

use workshop_core::{
    Amount, Asset, ContractId, Result, TrustAsset, WorkshopConfig,
};
use workshop_horizon::HorizonClient;
use workshop_soroban::SorobanClient;
use workshop_soroswap::SoroswapClient;

use crate::deploy::deploy_asset_contract;
use crate::issuance::{establish_trustline, issue_supply};
use crate::report::Reporter;
use crate::trading::{add_liquidity, swap_exact_in, LiquidityRequest, SwapRequest, TradeOutcome};
use crate::wallets::provision_wallets;

const TOKEN_CODE: &str = "RIO";
const TOKEN_SUPPLY_UNITS: i64 = 2_000_000;
const HOLDER_TRUST_LIMIT_UNITS: i64 = 10_000_000;
const LIQUIDITY_NATIVE_UNITS: i64 = 8_000;
const LIQUIDITY_TOKEN_UNITS: i64 = 1_000_000;
const TRADER_TRUST_LIMIT_UNITS: i64 = 1_000_000;
const SWAP_NATIVE_UNITS: i64 = 500;
const SLIPPAGE_BPS: u32 = 500;

pub async fn run(
    horizon: &dyn HorizonClient,
    soroban: &dyn SorobanClient,
    soroswap: &dyn SoroswapClient,
    config: &WorkshopConfig,
) -> Result<()> {
    let network = &config.network;
    let poll = &config.poll;
    let execute_trades = config.soroswap.is_configured();
    let mut report = Reporter::new();

    report.step("Creating and funding wallets");
    // Independent faucet requests, fanned out and awaited jointly.
    let mut wallets =
        provision_wallets(horizon, &["asset creator", "token holder", "trader"]).await?;
    let trader = wallets.pop().expect("three wallets provisioned");
    let holder = wallets.pop().expect("three wallets provisioned");
    let issuer = wallets.pop().expect("three wallets provisioned");

    report.step("Creating and issuing the token");
    let token = Asset::new(TOKEN_CODE, issuer.public_key())?;
    report.detail("asset", &token);
    establish_trustline(
        horizon,
        network,
        &holder.keypair,
        TrustAsset::Asset(token),
        Some(Amount::from_units(HOLDER_TRUST_LIMIT_UNITS)?),
    )
    .await?;
    issue_supply(
        horizon,
        network,
        &issuer.keypair,
        holder.public_key(),
        token,
        Amount::from_units(TOKEN_SUPPLY_UNITS)?,
    )
    .await?;

    report.step("Deploying the token to the contract environment");
    let token_contract =
        deploy_asset_contract(horizon, soroban, network, poll, &holder.keypair, token).await?;
    let native_contract = ContractId::native(network);
    report.detail("token contract", &token_contract);
    report.detail("native contract", &native_contract);

    report.step("Adding liquidity through the aggregator");
    if execute_trades {
        add_liquidity(
            soroswap,
            soroban,
            network,
            poll,
            &holder.keypair,
            &LiquidityRequest {
                asset_a: native_contract,
                asset_b: token_contract,
                amount_a: Amount::from_units(LIQUIDITY_NATIVE_UNITS)?,
                amount_b: Amount::from_units(LIQUIDITY_TOKEN_UNITS)?,
                slippage_bps: SLIPPAGE_BPS,
            },
        )
        .await?;
    } else {
        report.note("no aggregator API key configured, skipping liquidity provision");
    }

    report.step("Trader creates the token trustline");
    establish_trustline(
        horizon,
        network,
        &trader.keypair,
        TrustAsset::Asset(token),
        Some(Amount::from_units(TRADER_TRUST_LIMIT_UNITS)?),
    )
    .await?;

    report.step("Trading through the aggregator");
    let outcome = swap_exact_in(
        soroswap,
        soroban,
        network,
        poll,
        &trader.keypair,
        &SwapRequest {
            asset_in: native_contract,
            asset_out: token_contract,
            amount: Amount::from_units(SWAP_NATIVE_UNITS)?,
            slippage_bps: SLIPPAGE_BPS,
        },
        execute_trades,
    )
    .await?
    .into_result()?;
    match &outcome {
        TradeOutcome::Confirmed { hash } => report.detail("swap confirmed", hash),
        TradeOutcome::Simulated {
            amount_in,
            amount_out,
            ..
        } => report.note(&format!(
            "swap simulated from quote only: {amount_in} in, {amount_out} out (no API key)"
        )),
        TradeOutcome::Failed { .. } => unreachable!("failed outcomes were converted to errors"),
    }

    report.step("Final balances");
    let trader_account = horizon.load_account(&trader.public_key()).await?;
    let holder_account = horizon.load_account(&holder.public_key()).await?;
    report.balances("trader", &trader_account);
    report.balances("token holder", &holder_account);

    report.summary(&[
        ("asset", token.to_string()),
        ("token contract", token_contract.to_string()),
        ("native contract", native_contract.to_string()),
        ("token holder", holder.public_key().to_string()),
        ("trader", trader.public_key().to_string()),
    ]);
    Ok(())
}
