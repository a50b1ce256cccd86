mod amount;
mod asset;
mod contract;
mod network;
mod outcome;
mod pool;
mod price;

pub(crate) use asset::{read_account_id, write_account_id};

pub use amount::Amount;
pub use asset::Asset;
pub use contract::ContractId;
pub use network::Network;
pub use outcome::{TxHash, TxStatus};
pub use pool::{PoolId, PoolParameters, LIQUIDITY_POOL_FEE_BPS};
pub use price::{Price, PriceBand};
