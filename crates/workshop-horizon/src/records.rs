//! Horizon wire records for the endpoints the workflows touch.

use serde::{Deserialize, Deserializer, Serialize};

use workshop_core::{Amount, PublicKey, TxHash};

/// Account state as returned by `GET /accounts/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    pub account_id: PublicKey,
    #[serde(deserialize_with = "deserialize_i64_from_string")]
    #[serde(serialize_with = "serialize_i64_as_string")]
    pub sequence: i64,
    pub balances: Vec<BalanceLine>,
}

impl AccountRecord {
    /// Native balance, if the record carries one.
    pub fn native_balance(&self) -> Option<Amount> {
        self.balances.iter().find_map(|line| match line {
            BalanceLine::Native { balance } => Some(*balance),
            _ => None,
        })
    }
}

/// One entry of an account's `balances` array, tagged by `asset_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "asset_type")]
pub enum BalanceLine {
    #[serde(rename = "native")]
    Native { balance: Amount },
    #[serde(rename = "credit_alphanum4")]
    CreditAlphanum4 {
        balance: Amount,
        asset_code: String,
        asset_issuer: PublicKey,
    },
    #[serde(rename = "credit_alphanum12")]
    CreditAlphanum12 {
        balance: Amount,
        asset_code: String,
        asset_issuer: PublicKey,
    },
    #[serde(rename = "liquidity_pool_shares")]
    LiquidityPoolShares {
        balance: Amount,
        liquidity_pool_id: String,
    },
}

impl BalanceLine {
    pub fn balance(&self) -> Amount {
        match self {
            BalanceLine::Native { balance }
            | BalanceLine::CreditAlphanum4 { balance, .. }
            | BalanceLine::CreditAlphanum12 { balance, .. }
            | BalanceLine::LiquidityPoolShares { balance, .. } => *balance,
        }
    }

    /// Short label for narration: "XLM", the asset code, or "LP shares".
    pub fn label(&self) -> String {
        match self {
            BalanceLine::Native { .. } => "XLM".to_string(),
            BalanceLine::CreditAlphanum4 { asset_code, .. }
            | BalanceLine::CreditAlphanum12 { asset_code, .. } => asset_code.clone(),
            BalanceLine::LiquidityPoolShares { .. } => "LP shares".to_string(),
        }
    }
}

/// Successful `POST /transactions` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub hash: TxHash,
    #[serde(default)]
    pub ledger: Option<u32>,
    #[serde(default)]
    pub successful: bool,
}

/// Horizon problem document carried by failed submissions. The interesting
/// part is `extras.result_codes`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ProblemResponse {
    pub title: Option<String>,
    pub extras: Option<ProblemExtras>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ProblemExtras {
    pub result_codes: Option<ResultCodes>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ResultCodes {
    pub transaction: Option<String>,
    #[serde(default)]
    pub operations: Vec<String>,
}

impl ProblemResponse {
    /// Flatten the problem document into one line for the error chain.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(title) = &self.title {
            parts.push(title.clone());
        }
        if let Some(codes) = self.extras.as_ref().and_then(|e| e.result_codes.as_ref()) {
            if let Some(tx) = &codes.transaction {
                parts.push(format!("transaction: {tx}"));
            }
            if !codes.operations.is_empty() {
                parts.push(format!("operations: {}", codes.operations.join(", ")));
            }
        }
        if parts.is_empty() {
            "submission rejected".to_string()
        } else {
            parts.join("; ")
        }
    }
}

fn deserialize_i64_from_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}

fn serialize_i64_as_string<S>(value: &i64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_typed_balance_lines() {
        let json = r#"{
            "account_id": "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF",
            "sequence": "1099511627776",
            "balances": [
                {"asset_type": "liquidity_pool_shares", "balance": "223.6067977", "liquidity_pool_id": "abc123"},
                {"asset_type": "credit_alphanum4", "balance": "500000.0000000", "asset_code": "RIO",
                 "asset_issuer": "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF"},
                {"asset_type": "native", "balance": "9999.9999500"}
            ]
        }"#;
        let record: AccountRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.sequence, 1_099_511_627_776);
        assert_eq!(record.balances.len(), 3);
        assert_eq!(
            record.native_balance().unwrap(),
            "9999.99995".parse().unwrap()
        );
        assert_eq!(record.balances[1].label(), "RIO");
    }

    #[test]
    fn problem_description_includes_result_codes() {
        let json = r#"{
            "title": "Transaction Failed",
            "extras": {"result_codes": {"transaction": "tx_failed", "operations": ["op_no_trust"]}}
        }"#;
        let problem: ProblemResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            problem.describe(),
            "Transaction Failed; transaction: tx_failed; operations: op_no_trust"
        );
    }
}
