use std::env;

use crate::error::Result;
use crate::types::Network;

const DEFAULT_HORIZON_URL: &str = "https://horizon-testnet.stellar.org";
const DEFAULT_SOROBAN_RPC_URL: &str = "https://soroban-testnet.stellar.org";
const DEFAULT_SOROSWAP_API_URL: &str =
    "https://soroswap-api-staging-436722401508.us-central1.run.app";

/// Complete runner configuration. Every endpoint has a testnet default so the
/// binary runs with an empty environment; the aggregator API key is the only
/// value that cannot be defaulted.
#[derive(Debug, Clone)]
pub struct WorkshopConfig {
    pub horizon_url: String,
    pub soroban_rpc_url: String,
    pub soroswap: SoroswapConfig,
    pub network: Network,
    pub poll: PollConfig,
}

impl WorkshopConfig {
    /// Load configuration from environment variables, falling back to the
    /// hardcoded testnet defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let horizon_url = env_url("HORIZON_URL", DEFAULT_HORIZON_URL);
        let soroban_rpc_url = env_url("SOROBAN_RPC_URL", DEFAULT_SOROBAN_RPC_URL);

        let network = match env::var("NETWORK_PASSPHRASE") {
            Ok(passphrase) => Network::from_passphrase(passphrase.trim()),
            Err(_) => Network::testnet(),
        };

        Ok(Self {
            horizon_url,
            soroban_rpc_url,
            soroswap: SoroswapConfig::from_env(),
            network,
            poll: PollConfig::from_env(),
        })
    }
}

/// Trading aggregator configuration.
#[derive(Debug, Clone)]
pub struct SoroswapConfig {
    pub base_url: String,
    /// API key for the aggregator. Without it, trading runs quote-only.
    pub api_key: Option<String>,
}

impl SoroswapConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: env_url("SOROSWAP_API_URL", DEFAULT_SOROSWAP_API_URL),
            api_key: env::var("SOROSWAP_API_KEY")
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
        }
    }

    /// Check if the aggregator can execute trades (not just quote them).
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Transaction status polling: capped exponential backoff with a deadline.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// First delay between status reads (default: 1000)
    pub initial_delay_ms: u64,
    /// Backoff cap (default: 8000)
    pub max_delay_ms: u64,
    /// Give up after this long and surface a timeout error (default: 60)
    pub deadline_secs: u64,
}

impl PollConfig {
    pub fn from_env() -> Self {
        Self {
            initial_delay_ms: env::var("POLL_INITIAL_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1000),
            max_delay_ms: env::var("POLL_MAX_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8000),
            deadline_secs: env::var("POLL_DEADLINE_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 1000,
            max_delay_ms: 8000,
            deadline_secs: 60,
        }
    }
}

fn env_url(var: &str, default: &str) -> String {
    match env::var(var) {
        Ok(url) => sanitize_url(url),
        Err(_) => default.to_string(),
    }
}

/// Sanitize URL by removing surrounding quotes and whitespace
fn sanitize_url(url: String) -> String {
    let trimmed = url.trim();
    let without_quotes = if trimmed.starts_with('"') && trimmed.ends_with('"') {
        &trimmed[1..trimmed.len() - 1]
    } else if trimmed.starts_with('\'') && trimmed.ends_with('\'') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };
    without_quotes.to_string()
}
