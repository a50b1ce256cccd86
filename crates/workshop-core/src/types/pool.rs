use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

use crate::error::{Result, WorkshopError};
use crate::types::Asset;
use crate::xdr::{Reader, Writer};

/// The only pool fee the protocol supports: 30 basis points (0.30%).
pub const LIQUIDITY_POOL_FEE_BPS: u32 = 30;

const LIQUIDITY_POOL_CONSTANT_PRODUCT: u32 = 0;

/// Constant-product pool parameters. The asset pair is reordered into
/// canonical form on construction, so the derived identifier does not depend
/// on argument order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolParameters {
    asset_a: Asset,
    asset_b: Asset,
    fee_bps: u32,
}

impl PoolParameters {
    pub fn new(first: Asset, second: Asset, fee_bps: u32) -> Result<Self> {
        if first == second {
            return Err(WorkshopError::InvalidAsset(format!(
                "a pool needs two distinct assets, got {first} twice"
            )));
        }
        let (asset_a, asset_b) = if first.canonical_cmp(&second).is_le() {
            (first, second)
        } else {
            (second, first)
        };
        Ok(PoolParameters {
            asset_a,
            asset_b,
            fee_bps,
        })
    }

    /// First asset in canonical order.
    pub fn asset_a(&self) -> Asset {
        self.asset_a
    }

    /// Second asset in canonical order.
    pub fn asset_b(&self) -> Asset {
        self.asset_b
    }

    pub fn fee_bps(&self) -> u32 {
        self.fee_bps
    }

    /// The pool identifier: SHA-256 of the XDR form of the parameters.
    pub fn id(&self) -> PoolId {
        let mut w = Writer::new();
        self.write_xdr(&mut w);
        PoolId(Sha256::digest(w.into_bytes()).into())
    }

    pub fn write_xdr(&self, w: &mut Writer) {
        w.write_u32(LIQUIDITY_POOL_CONSTANT_PRODUCT);
        self.asset_a.write_xdr(w);
        self.asset_b.write_xdr(w);
        w.write_i32(self.fee_bps as i32);
    }

    pub fn read_xdr(r: &mut Reader<'_>) -> Result<Self> {
        match r.read_u32()? {
            LIQUIDITY_POOL_CONSTANT_PRODUCT => {}
            other => {
                return Err(WorkshopError::Codec(format!(
                    "unknown liquidity pool type {other}"
                )))
            }
        }
        let asset_a = Asset::read_xdr(r)?;
        let asset_b = Asset::read_xdr(r)?;
        let fee_bps = r.read_i32()? as u32;
        PoolParameters::new(asset_a, asset_b, fee_bps)
    }
}

/// Deterministic 32-byte pool identifier, displayed as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolId(pub [u8; 32]);

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PoolId({self})")
    }
}

impl FromStr for PoolId {
    type Err = WorkshopError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)
            .map_err(|e| WorkshopError::Codec(format!("invalid pool id hex: {e}")))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| WorkshopError::Codec("pool id must be 32 bytes".into()))?;
        Ok(PoolId(bytes))
    }
}
