//! Account provisioning: key generation, faucet funding, initial state load.

use futures::future::try_join_all;
use tracing::info;

use workshop_core::{Keypair, PublicKey, Result};
use workshop_horizon::{AccountRecord, HorizonClient};

/// A freshly generated, faucet-funded account.
pub struct FundedWallet {
    pub keypair: Keypair,
    pub account: AccountRecord,
}

impl FundedWallet {
    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }
}

/// Generate a key pair, fund it through the faucet and load its state. A
/// faucet failure (unavailable, already funded) propagates and aborts the
/// run; there are no retries.
pub async fn provision_wallet(horizon: &dyn HorizonClient, label: &str) -> Result<FundedWallet> {
    let keypair = Keypair::random();
    let public_key = keypair.public_key();
    info!(wallet = label, public_key = %public_key, "wallet created");

    horizon.fund_account(&public_key).await?;
    let account = horizon.load_account(&public_key).await?;
    if let Some(balance) = account.native_balance() {
        info!(wallet = label, balance = %balance, "wallet funded");
    }
    Ok(FundedWallet { keypair, account })
}

/// Provision several wallets at once. The independent faucet requests are
/// fanned out and awaited jointly; if one fails the whole join fails.
pub async fn provision_wallets(
    horizon: &dyn HorizonClient,
    labels: &[&str],
) -> Result<Vec<FundedWallet>> {
    try_join_all(labels.iter().map(|label| provision_wallet(horizon, label))).await
}
