use async_trait::async_trait;

use workshop_core::{PublicKey, Result, SignedTransaction};

use crate::records::{AccountRecord, SubmitResponse};

/// Boundary to the underlying ledger network. Implemented over HTTP by
/// [`crate::HorizonHttpClient`] and by an in-memory ledger double in tests.
#[async_trait]
pub trait HorizonClient: Send + Sync {
    /// Ask the testnet faucet to create and fund the account. Funding an
    /// account that already exists is an error and is not retried.
    async fn fund_account(&self, account: &PublicKey) -> Result<()>;

    /// Load current sequence number and balances.
    async fn load_account(&self, account: &PublicKey) -> Result<AccountRecord>;

    /// Submit a signed transaction and wait for the ingestion result.
    async fn submit_transaction(&self, tx: &SignedTransaction) -> Result<SubmitResponse>;
}
