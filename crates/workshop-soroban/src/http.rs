use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use workshop_core::{Result, SignedTransaction, Transaction, TxHash, TxStatus, WorkshopError};

use crate::client::SorobanClient;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Soroban RPC client over JSON-RPC 2.0.
pub struct SorobanHttpClient {
    client: Client,
    url: Url,
    next_id: AtomicU64,
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a, P: Serialize> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<R> {
    result: Option<R>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResult {
    #[serde(default)]
    min_resource_fee: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendResult {
    status: String,
    hash: TxHash,
    #[serde(default)]
    error_result_xdr: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GetResult {
    status: TxStatus,
}

impl SorobanHttpClient {
    pub fn new(url: &str) -> Result<Self> {
        let url: Url = url
            .parse()
            .map_err(|e| WorkshopError::InvalidConfig(format!("invalid Soroban RPC URL: {e}")))?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| WorkshopError::Http(e.to_string()))?;
        Ok(Self {
            client,
            url,
            next_id: AtomicU64::new(1),
        })
    }

    async fn call<P: Serialize, R: DeserializeOwned>(&self, method: &str, params: P) -> Result<R> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        let resp = self
            .client
            .post(self.url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| WorkshopError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(WorkshopError::SorobanRpc(format!(
                "{method} returned {status}: {body}"
            )));
        }
        let envelope: RpcResponse<R> = resp
            .json()
            .await
            .map_err(|e| WorkshopError::SorobanRpc(format!("malformed {method} response: {e}")))?;
        if let Some(err) = envelope.error {
            return Err(WorkshopError::SorobanRpc(format!(
                "{method} error {}: {}",
                err.code, err.message
            )));
        }
        envelope
            .result
            .ok_or_else(|| WorkshopError::SorobanRpc(format!("{method} returned no result")))
    }
}

#[async_trait]
impl SorobanClient for SorobanHttpClient {
    async fn prepare_transaction(&self, tx: &Transaction) -> Result<Transaction> {
        let result: SimulateResult = self
            .call(
                "simulateTransaction",
                json!({ "transaction": tx.to_unsigned_envelope_base64() }),
            )
            .await?;
        if let Some(error) = result.error {
            return Err(WorkshopError::SorobanRpc(format!(
                "simulation failed: {error}"
            )));
        }
        let resource_fee: u32 = result
            .min_resource_fee
            .as_deref()
            .unwrap_or("0")
            .parse()
            .map_err(|_| {
                WorkshopError::SorobanRpc("simulation returned a malformed resource fee".into())
            })?;
        debug!(resource_fee, "transaction prepared");

        let mut prepared = tx.clone();
        prepared.fee = prepared.fee.saturating_add(resource_fee);
        Ok(prepared)
    }

    async fn send_transaction(&self, tx: &SignedTransaction) -> Result<TxHash> {
        let result: SendResult = self
            .call(
                "sendTransaction",
                json!({ "transaction": tx.to_envelope_base64() }),
            )
            .await?;
        match result.status.as_str() {
            "PENDING" | "DUPLICATE" => {
                debug!(hash = %result.hash, status = %result.status, "transaction accepted");
                Ok(result.hash)
            }
            other => Err(WorkshopError::SorobanRpc(format!(
                "send rejected with status {other}{}",
                result
                    .error_result_xdr
                    .map(|xdr| format!(" ({xdr})"))
                    .unwrap_or_default()
            ))),
        }
    }

    async fn get_transaction(&self, hash: &TxHash) -> Result<TxStatus> {
        let result: GetResult = self
            .call("getTransaction", json!({ "hash": hash.to_string() }))
            .await?;
        Ok(result.status)
    }
}
