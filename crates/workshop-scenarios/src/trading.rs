//! Trading through the aggregator: quote -> build -> sign -> send -> poll.
//!
//! Every phase's output is a required input to the next and nothing is
//! cached. The outcome type keeps confirmed, simulated and failed trades
//! apart; a failure is never reported as anything but a failure.

use tracing::{info, warn};

use workshop_core::{
    Amount, ContractId, Keypair, Network, PollConfig, Result, SignedTransaction, TxHash, TxStatus,
    WorkshopError,
};
use workshop_soroban::{confirm_transaction, wait_for_transaction, SorobanClient};
use workshop_soroswap::{
    AddLiquidityRequest, BuildRequest, Protocol, QuoteRequest, SoroswapClient, TradeType,
};

/// What actually happened to a requested trade.
#[derive(Debug)]
pub enum TradeOutcome {
    /// Executed and observed as SUCCESS on the network.
    Confirmed { hash: TxHash },
    /// A quote was obtained but execution was deliberately not attempted
    /// (no aggregator API key configured). Not a masked failure.
    Simulated {
        amount_in: String,
        amount_out: String,
        platform: Option<String>,
    },
    /// Executed and observed as a terminal failure.
    Failed { hash: TxHash, status: TxStatus },
}

pub struct SwapRequest {
    pub asset_in: ContractId,
    pub asset_out: ContractId,
    pub amount: Amount,
    pub slippage_bps: u32,
}

/// Swap an exact input amount. With `execute` false the flow stops after the
/// quote and returns [`TradeOutcome::Simulated`].
pub async fn swap_exact_in(
    soroswap: &dyn SoroswapClient,
    soroban: &dyn SorobanClient,
    network: &Network,
    poll: &PollConfig,
    trader: &Keypair,
    request: &SwapRequest,
    execute: bool,
) -> Result<TradeOutcome> {
    let quote = soroswap
        .quote(&QuoteRequest {
            asset_in: request.asset_in.to_string(),
            asset_out: request.asset_out.to_string(),
            amount: request.amount.stroops().to_string(),
            trade_type: TradeType::ExactIn,
            protocols: vec![Protocol::Soroswap],
            slippage_bps: request.slippage_bps,
        })
        .await?;
    info!(
        amount_in = %quote.amount_in,
        amount_out = %quote.amount_out,
        price_impact_pct = ?quote.price_impact_pct,
        "quote received"
    );

    if !execute {
        return Ok(TradeOutcome::Simulated {
            amount_in: quote.amount_in,
            amount_out: quote.amount_out,
            platform: quote.platform,
        });
    }

    let trader_address = trader.public_key().to_string();
    let build = soroswap
        .build(&BuildRequest {
            quote,
            from: trader_address.clone(),
            to: trader_address,
        })
        .await?;

    let mut envelope = SignedTransaction::from_envelope_base64(&build.xdr)?;
    envelope.add_signature(network, trader);
    let local_hash = envelope.hash(network);

    let sent = soroswap.send(&envelope.to_envelope_base64()).await?;
    let hash = match sent.hash.as_deref() {
        Some(h) => h.parse()?,
        None => local_hash,
    };
    info!(hash = %hash, "swap submitted");

    match wait_for_transaction(soroban, &hash, poll).await? {
        TxStatus::Success => Ok(TradeOutcome::Confirmed { hash }),
        status => {
            warn!(hash = %hash, status = %status, "swap did not succeed");
            Ok(TradeOutcome::Failed { hash, status })
        }
    }
}

pub struct LiquidityRequest {
    pub asset_a: ContractId,
    pub asset_b: ContractId,
    pub amount_a: Amount,
    pub amount_b: Amount,
    pub slippage_bps: u32,
}

/// Provide paired liquidity through the aggregator: it builds the unsigned
/// envelope, we sign and submit it to the contract network and poll to
/// finality.
pub async fn add_liquidity(
    soroswap: &dyn SoroswapClient,
    soroban: &dyn SorobanClient,
    network: &Network,
    poll: &PollConfig,
    provider: &Keypair,
    request: &LiquidityRequest,
) -> Result<TxHash> {
    let build = soroswap
        .add_liquidity(&AddLiquidityRequest {
            asset_a: request.asset_a.to_string(),
            asset_b: request.asset_b.to_string(),
            amount_a: request.amount_a.stroops().to_string(),
            amount_b: request.amount_b.stroops().to_string(),
            to: provider.public_key().to_string(),
            slippage_bps: request.slippage_bps.to_string(),
        })
        .await?;

    let mut envelope = SignedTransaction::from_envelope_base64(&build.xdr)?;
    envelope.add_signature(network, provider);
    let hash = soroban.send_transaction(&envelope).await?;
    info!(hash = %hash, "liquidity transaction submitted");

    confirm_transaction(soroban, &hash, poll).await?;
    info!(hash = %hash, "liquidity added");
    Ok(hash)
}

impl TradeOutcome {
    /// Convert a terminal on-chain failure into an error; confirmed and
    /// simulated outcomes pass through.
    pub fn into_result(self) -> Result<TradeOutcome> {
        match self {
            TradeOutcome::Failed { hash, status } => Err(WorkshopError::TransactionFailed {
                hash: hash.to_string(),
                status: status.to_string(),
            }),
            other => Ok(other),
        }
    }
}
