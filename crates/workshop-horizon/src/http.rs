use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use workshop_core::{PublicKey, Result, SignedTransaction, WorkshopError};

use crate::client::HorizonClient;
use crate::records::{AccountRecord, ProblemResponse, SubmitResponse};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Horizon client over HTTP. Constructed once and passed to each workflow
/// function; holds no state besides the connection pool.
pub struct HorizonHttpClient {
    client: Client,
    base_url: Url,
}

impl HorizonHttpClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url: Url = base_url
            .parse()
            .map_err(|e| WorkshopError::InvalidConfig(format!("invalid Horizon URL: {e}")))?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| WorkshopError::Http(e.to_string()))?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| WorkshopError::InvalidConfig(format!("invalid Horizon path {path}: {e}")))
    }
}

#[async_trait]
impl HorizonClient for HorizonHttpClient {
    async fn fund_account(&self, account: &PublicKey) -> Result<()> {
        let url = self.endpoint("friendbot")?;
        let resp = self
            .client
            .get(url)
            .query(&[("addr", account.to_string())])
            .send()
            .await
            .map_err(|e| WorkshopError::Http(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            debug!(account = %account, "friendbot funding confirmed");
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(WorkshopError::Faucet(format!(
            "friendbot returned {status} for {account}: {body}"
        )))
    }

    async fn load_account(&self, account: &PublicKey) -> Result<AccountRecord> {
        let url = self.endpoint(&format!("accounts/{account}"))?;
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| WorkshopError::Http(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(WorkshopError::Horizon(format!("account {account} not found")));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(WorkshopError::Horizon(format!(
                "account load returned {status}: {body}"
            )));
        }
        resp.json()
            .await
            .map_err(|e| WorkshopError::Horizon(format!("malformed account record: {e}")))
    }

    async fn submit_transaction(&self, tx: &SignedTransaction) -> Result<SubmitResponse> {
        let url = self.endpoint("transactions")?;
        let resp = self
            .client
            .post(url)
            .form(&[("tx", tx.to_envelope_base64())])
            .send()
            .await
            .map_err(|e| WorkshopError::Http(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            let submitted: SubmitResponse = resp
                .json()
                .await
                .map_err(|e| WorkshopError::Horizon(format!("malformed submit response: {e}")))?;
            debug!(hash = %submitted.hash, ledger = ?submitted.ledger, "transaction ingested");
            return Ok(submitted);
        }

        // Failed submissions carry a problem document whose result codes are
        // the only way to see why the ledger rejected the transaction.
        let body = resp.text().await.unwrap_or_default();
        let detail = match serde_json::from_str::<ProblemResponse>(&body) {
            Ok(problem) => problem.describe(),
            Err(_) => body,
        };
        Err(WorkshopError::Horizon(format!(
            "submission returned {status}: {detail}"
        )))
    }
}
