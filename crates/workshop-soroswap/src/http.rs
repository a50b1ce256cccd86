use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use workshop_core::{Result, SoroswapConfig, WorkshopError};

use crate::client::SoroswapClient;
use crate::types::{
    AddLiquidityRequest, BuildRequest, BuildResponse, Quote, QuoteRequest, SendResponse,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Aggregator client over REST, authenticated with a bearer API key. Without
/// a key, requests go out unauthenticated; quotes may still be served but
/// execution endpoints will be rejected by the service.
pub struct SoroswapHttpClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
    network: String,
}

impl SoroswapHttpClient {
    /// `network` is the aggregator-side network label, e.g. "testnet".
    pub fn new(config: &SoroswapConfig, network: &str) -> Result<Self> {
        let base_url: Url = config
            .base_url
            .parse()
            .map_err(|e| WorkshopError::InvalidConfig(format!("invalid aggregator URL: {e}")))?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| WorkshopError::Http(e.to_string()))?;
        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
            network: network.to_string(),
        })
    }

    async fn post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        let url = self.base_url.join(path).map_err(|e| {
            WorkshopError::InvalidConfig(format!("invalid aggregator path {path}: {e}"))
        })?;
        let mut request = self
            .client
            .post(url)
            .query(&[("network", self.network.as_str())])
            .json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let resp = request
            .send()
            .await
            .map_err(|e| WorkshopError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(WorkshopError::Aggregator(format!(
                "{path} returned {status}: {body}"
            )));
        }
        resp.json()
            .await
            .map_err(|e| WorkshopError::Aggregator(format!("malformed {path} response: {e}")))
    }
}

#[async_trait]
impl SoroswapClient for SoroswapHttpClient {
    async fn quote(&self, request: &QuoteRequest) -> Result<Quote> {
        let quote: Quote = self.post("quote", request).await?;
        debug!(
            amount_in = %quote.amount_in,
            amount_out = %quote.amount_out,
            platform = ?quote.platform,
            "quote received"
        );
        Ok(quote)
    }

    async fn build(&self, request: &BuildRequest) -> Result<BuildResponse> {
        self.post("quote/build", request).await
    }

    async fn add_liquidity(&self, request: &AddLiquidityRequest) -> Result<BuildResponse> {
        self.post("liquidity/add", request).await
    }

    async fn send(&self, signed_xdr: &str) -> Result<SendResponse> {
        self.post("send", &json!({ "xdr": signed_xdr, "launchtube": false }))
            .await
    }
}
