//! Two custom assets and three liquidity pools on the classic ledger,
//! issued and funded by a single liquidity provider.

use workshop_core::{
    Amount, Asset, PoolParameters, PriceBand, Result, TrustAsset, WorkshopConfig,
    LIQUIDITY_POOL_FEE_BPS,
};
use workshop_horizon::HorizonClient;

use crate::issuance::{establish_trustlines, send_payments};
use crate::pools::deposit_liquidity;
use crate::report::Reporter;
use crate::wallets::provision_wallet;

pub async fn run(horizon: &dyn HorizonClient, config: &WorkshopConfig) -> Result<()> {
    let network = &config.network;
    let mut report = Reporter::new();

    report.step("Provisioning accounts");
    let provider = provision_wallet(horizon, "liquidity provider").await?;
    let recipient = provision_wallet(horizon, "recipient").await?;

    report.step("Creating assets");
    let sat1 = Asset::new("SAT1", provider.public_key())?;
    let sat2 = Asset::new("SAT2", provider.public_key())?;
    report.detail("asset", &sat1);
    report.detail("asset", &sat2);

    report.step("Establishing recipient trustlines");
    establish_trustlines(
        horizon,
        network,
        &recipient.keypair,
        vec![
            (TrustAsset::Asset(sat1), None),
            (TrustAsset::Asset(sat2), None),
        ],
    )
    .await?;

    report.step("Issuing assets");
    send_payments(
        horizon,
        network,
        &provider.keypair,
        vec![
            (recipient.public_key(), sat1, Amount::from_units(10_000_000)?),
            (recipient.public_key(), sat2, Amount::from_units(15_000_000)?),
        ],
    )
    .await?;

    report.step("Transferring working balances back to the provider");
    // The provider is the issuer, so no trustlines are needed on its side.
    send_payments(
        horizon,
        network,
        &recipient.keypair,
        vec![
            (provider.public_key(), sat1, Amount::from_units(6_000_000)?),
            (provider.public_key(), sat2, Amount::from_units(10_000_000)?),
        ],
    )
    .await?;
    let provider_account = horizon.load_account(&provider.public_key()).await?;
    report.balances("liquidity provider", &provider_account);

    report.step("Creating liquidity pools");
    let xlm_sat1 = PoolParameters::new(Asset::native(), sat1, LIQUIDITY_POOL_FEE_BPS)?;
    let xlm_sat2 = PoolParameters::new(Asset::native(), sat2, LIQUIDITY_POOL_FEE_BPS)?;
    let sat1_sat2 = PoolParameters::new(sat1, sat2, LIQUIDITY_POOL_FEE_BPS)?;
    report.detail("XLM/SAT1 pool", &xlm_sat1.id());
    report.detail("XLM/SAT2 pool", &xlm_sat2.id());
    report.detail("SAT1/SAT2 pool", &sat1_sat2.id());

    establish_trustlines(
        horizon,
        network,
        &provider.keypair,
        vec![
            (TrustAsset::PoolShare(xlm_sat1), None),
            (TrustAsset::PoolShare(xlm_sat2), None),
            (TrustAsset::PoolShare(sat1_sat2), None),
        ],
    )
    .await?;

    report.step("Depositing liquidity");
    let band = PriceBand::default();
    deposit_liquidity(
        horizon,
        network,
        &provider.keypair,
        xlm_sat1,
        [
            (Asset::native(), Amount::from_units(4_000)?),
            (sat1, Amount::from_units(5_000_000)?),
        ],
        band,
    )
    .await?;
    deposit_liquidity(
        horizon,
        network,
        &provider.keypair,
        xlm_sat2,
        [
            (Asset::native(), Amount::from_units(4_000)?),
            (sat2, Amount::from_units(8_000_000)?),
        ],
        band,
    )
    .await?;
    // Ratio follows the implied lumen prices of the two assets:
    // SAT1 at 4000/5M and SAT2 at 4000/8M gives roughly 1.6 SAT1 per SAT2.
    deposit_liquidity(
        horizon,
        network,
        &provider.keypair,
        sat1_sat2,
        [
            (sat1, Amount::from_units(800_000)?),
            (sat2, Amount::from_units(500_000)?),
        ],
        band,
    )
    .await?;

    let provider_account = horizon.load_account(&provider.public_key()).await?;
    report.balances("liquidity provider", &provider_account);

    report.summary(&[
        ("assets", format!("{sat1}, {sat2}")),
        ("XLM/SAT1 pool", xlm_sat1.id().to_string()),
        ("XLM/SAT2 pool", xlm_sat2.id().to_string()),
        ("SAT1/SAT2 pool", sat1_sat2.id().to_string()),
        ("liquidity provider", provider.public_key().to_string()),
    ]);
    Ok(())
}
