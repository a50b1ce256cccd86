use async_trait::async_trait;

use workshop_core::{Result, SignedTransaction, Transaction, TxHash, TxStatus};

/// Boundary to the contract-execution layer. Implemented over JSON-RPC by
/// [`crate::SorobanHttpClient`] and by doubles in tests.
#[async_trait]
pub trait SorobanClient: Send + Sync {
    /// Simulate the transaction and return it with the resource fee the
    /// network quoted folded into the fee field.
    async fn prepare_transaction(&self, tx: &Transaction) -> Result<Transaction>;

    /// Submit a signed transaction for inclusion.
    async fn send_transaction(&self, tx: &SignedTransaction) -> Result<TxHash>;

    /// Read the current status of a submitted transaction. `NotFound` means
    /// the network has not ingested it yet.
    async fn get_transaction(&self, hash: &TxHash) -> Result<TxStatus>;
}
