pub mod config;
pub mod crypto;
pub mod error;
pub mod tx;
pub mod types;
pub mod xdr;

pub use config::{PollConfig, SoroswapConfig, WorkshopConfig};
pub use crypto::{Keypair, PublicKey, Signature};
pub use error::{Result, WorkshopError};
pub use tx::{Operation, SignedTransaction, Transaction, TransactionBuilder, TrustAsset, BASE_FEE};
pub use types::{
    Amount, Asset, ContractId, Network, PoolId, PoolParameters, Price, PriceBand, TxHash, TxStatus,
    LIQUIDITY_POOL_FEE_BPS,
};
