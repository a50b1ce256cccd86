use async_trait::async_trait;

use workshop_core::Result;

use crate::types::{AddLiquidityRequest, BuildRequest, BuildResponse, Quote, QuoteRequest, SendResponse};

/// Boundary to the exchange aggregator. The trading protocol is
/// quote -> build -> sign (locally) -> send; each phase's output is a
/// required input to the next.
#[async_trait]
pub trait SoroswapClient: Send + Sync {
    async fn quote(&self, request: &QuoteRequest) -> Result<Quote>;

    async fn build(&self, request: &BuildRequest) -> Result<BuildResponse>;

    async fn add_liquidity(&self, request: &AddLiquidityRequest) -> Result<BuildResponse>;

    /// Broadcast a signed envelope through the aggregator.
    async fn send(&self, signed_xdr: &str) -> Result<SendResponse>;
}
