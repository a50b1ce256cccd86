use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkshopError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid asset: {0}")]
    InvalidAsset(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("HTTP transport error: {0}")]
    Http(String),

    #[error("Faucet error: {0}")]
    Faucet(String),

    #[error("Horizon error: {0}")]
    Horizon(String),

    #[error("Soroban RPC error: {0}")]
    SorobanRpc(String),

    #[error("Aggregator error: {0}")]
    Aggregator(String),

    #[error("Transaction {hash} failed with status {status}")]
    TransactionFailed { hash: String, status: String },

    #[error("Transaction {hash} not finalized after {waited_secs}s")]
    PollTimeout { hash: String, waited_secs: u64 },
}

pub type Result<T> = std::result::Result<T, WorkshopError>;
