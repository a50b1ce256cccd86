use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WorkshopError};

/// Transaction hash, displayed as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxHash(pub [u8; 32]);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({self})")
    }
}

impl FromStr for TxHash {
    type Err = WorkshopError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes =
            hex::decode(s).map_err(|e| WorkshopError::Codec(format!("invalid tx hash: {e}")))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| WorkshopError::Codec("tx hash must be 32 bytes".into()))?;
        Ok(TxHash(bytes))
    }
}

impl Serialize for TxHash {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Observed status of a submitted transaction.
///
/// `NotFound` is a transient pre-ingestion state, not a terminal failure:
/// the ledger has not seen the transaction yet. The machine is
/// `PENDING -> {SUCCESS, FAILED}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxStatus {
    NotFound,
    Pending,
    Success,
    Failed,
}

impl TxStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TxStatus::Success | TxStatus::Failed)
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TxStatus::NotFound => "NOT_FOUND",
            TxStatus::Pending => "PENDING",
            TxStatus::Success => "SUCCESS",
            TxStatus::Failed => "FAILED",
        };
        f.write_str(s)
    }
}
