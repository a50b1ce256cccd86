//! Aggregator wire types. Field names follow the service's camelCase JSON;
//! amounts travel as decimal strings of stroops.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeType {
    ExactIn,
    ExactOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Soroswap,
    Phoenix,
    Aqua,
}

/// Phase 1: ask for a price on an exact amount.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    /// Contract address of the asset being sold.
    pub asset_in: String,
    /// Contract address of the asset being bought.
    pub asset_out: String,
    /// Stroops, as a decimal string.
    pub amount: String,
    pub trade_type: TradeType,
    pub protocols: Vec<Protocol>,
    pub slippage_bps: u32,
}

/// A quote. The whole object is passed back verbatim to the build phase, so
/// fields this client does not interpret are preserved in `rest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub amount_in: String,
    pub amount_out: String,
    #[serde(default)]
    pub price_impact_pct: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

/// Phase 2: realize a quote as an unsigned transaction for these accounts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequest {
    pub quote: Quote,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildResponse {
    /// Unsigned transaction envelope, base64 XDR. Signed locally.
    pub xdr: String,
}

/// Liquidity provision through the aggregator; also returns an unsigned
/// envelope to sign and submit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLiquidityRequest {
    pub asset_a: String,
    pub asset_b: String,
    pub amount_a: String,
    pub amount_b: String,
    pub to: String,
    pub slippage_bps: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_preserves_unknown_fields_for_the_build_phase() {
        let json = r#"{
            "amountIn": "5000000000",
            "amountOut": "623441390",
            "priceImpactPct": "0.06",
            "platform": "router",
            "routePlan": [{"protocol": "soroswap", "percent": "100"}]
        }"#;
        let quote: Quote = serde_json::from_str(json).unwrap();
        assert_eq!(quote.amount_in, "5000000000");
        assert!(quote.rest.contains_key("routePlan"));

        let round_tripped = serde_json::to_value(&quote).unwrap();
        assert_eq!(round_tripped["routePlan"][0]["protocol"], "soroswap");
    }

    #[test]
    fn request_wire_names_are_camel_case() {
        let req = QuoteRequest {
            asset_in: "CIN".into(),
            asset_out: "COUT".into(),
            amount: "5000000000".into(),
            trade_type: TradeType::ExactIn,
            protocols: vec![Protocol::Soroswap],
            slippage_bps: 500,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["assetIn"], "CIN");
        assert_eq!(value["tradeType"], "EXACT_IN");
        assert_eq!(value["protocols"][0], "soroswap");
        assert_eq!(value["slippageBps"], 500);
    }
}
