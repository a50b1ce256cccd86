use std::cmp::Ordering;
use std::fmt;

use crate::crypto::PublicKey;
use crate::error::{Result, WorkshopError};
use crate::xdr::{Reader, Writer};

const ASSET_TYPE_NATIVE: u32 = 0;
const ASSET_TYPE_CREDIT_ALPHANUM4: u32 = 1;
const ASSET_TYPE_CREDIT_ALPHANUM12: u32 = 2;

const PUBLIC_KEY_TYPE_ED25519: u32 = 0;

/// A ledger asset: the native lumen or a (code, issuer) credit pair. Codes of
/// one to four characters use the alphanum4 form, five to twelve the
/// alphanum12 form, zero-padded on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Asset {
    Native,
    CreditAlphanum4 { code: [u8; 4], issuer: PublicKey },
    CreditAlphanum12 { code: [u8; 12], issuer: PublicKey },
}

impl Asset {
    pub fn native() -> Self {
        Asset::Native
    }

    pub fn new(code: &str, issuer: PublicKey) -> Result<Self> {
        if code.is_empty() || code.len() > 12 {
            return Err(WorkshopError::InvalidAsset(format!(
                "asset code {code:?} must be 1-12 characters"
            )));
        }
        if !code.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(WorkshopError::InvalidAsset(format!(
                "asset code {code:?} must be alphanumeric"
            )));
        }
        if code.len() <= 4 {
            let mut padded = [0u8; 4];
            padded[..code.len()].copy_from_slice(code.as_bytes());
            Ok(Asset::CreditAlphanum4 {
                code: padded,
                issuer,
            })
        } else {
            let mut padded = [0u8; 12];
            padded[..code.len()].copy_from_slice(code.as_bytes());
            Ok(Asset::CreditAlphanum12 {
                code: padded,
                issuer,
            })
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Asset::Native)
    }

    /// Asset code with wire padding stripped; "XLM" for the native asset.
    pub fn code(&self) -> String {
        match self {
            Asset::Native => "XLM".to_string(),
            Asset::CreditAlphanum4 { code, .. } => trimmed(code),
            Asset::CreditAlphanum12 { code, .. } => trimmed(code),
        }
    }

    pub fn issuer(&self) -> Option<PublicKey> {
        match self {
            Asset::Native => None,
            Asset::CreditAlphanum4 { issuer, .. } | Asset::CreditAlphanum12 { issuer, .. } => {
                Some(*issuer)
            }
        }
    }

    /// Pool ordering: native before alphanum4 before alphanum12, then by code
    /// bytes, then by issuer bytes.
    pub fn canonical_cmp(&self, other: &Asset) -> Ordering {
        fn rank(asset: &Asset) -> u8 {
            match asset {
                Asset::Native => 0,
                Asset::CreditAlphanum4 { .. } => 1,
                Asset::CreditAlphanum12 { .. } => 2,
            }
        }
        fn key(asset: &Asset) -> (Vec<u8>, Vec<u8>) {
            match asset {
                Asset::Native => (Vec::new(), Vec::new()),
                Asset::CreditAlphanum4 { code, issuer } => (code.to_vec(), issuer.0.to_vec()),
                Asset::CreditAlphanum12 { code, issuer } => (code.to_vec(), issuer.0.to_vec()),
            }
        }
        rank(self)
            .cmp(&rank(other))
            .then_with(|| key(self).cmp(&key(other)))
    }

    pub fn write_xdr(&self, w: &mut Writer) {
        match self {
            Asset::Native => w.write_u32(ASSET_TYPE_NATIVE),
            Asset::CreditAlphanum4 { code, issuer } => {
                w.write_u32(ASSET_TYPE_CREDIT_ALPHANUM4);
                w.write_opaque_fixed(code);
                write_account_id(w, issuer);
            }
            Asset::CreditAlphanum12 { code, issuer } => {
                w.write_u32(ASSET_TYPE_CREDIT_ALPHANUM12);
                w.write_opaque_fixed(code);
                write_account_id(w, issuer);
            }
        }
    }

    pub fn read_xdr(r: &mut Reader<'_>) -> Result<Self> {
        match r.read_u32()? {
            ASSET_TYPE_NATIVE => Ok(Asset::Native),
            ASSET_TYPE_CREDIT_ALPHANUM4 => {
                let code: [u8; 4] = r.read_opaque_fixed(4)?.try_into().unwrap();
                Ok(Asset::CreditAlphanum4 {
                    code,
                    issuer: read_account_id(r)?,
                })
            }
            ASSET_TYPE_CREDIT_ALPHANUM12 => {
                let code: [u8; 12] = r.read_opaque_fixed(12)?.try_into().unwrap();
                Ok(Asset::CreditAlphanum12 {
                    code,
                    issuer: read_account_id(r)?,
                })
            }
            other => Err(WorkshopError::Codec(format!("unknown asset type {other}"))),
        }
    }
}

pub(crate) fn write_account_id(w: &mut Writer, key: &PublicKey) {
    w.write_u32(PUBLIC_KEY_TYPE_ED25519);
    w.write_opaque_fixed(key.as_bytes());
}

pub(crate) fn read_account_id(r: &mut Reader<'_>) -> Result<PublicKey> {
    match r.read_u32()? {
        PUBLIC_KEY_TYPE_ED25519 => {
            let bytes: [u8; 32] = r.read_opaque_fixed(32)?.try_into().unwrap();
            Ok(PublicKey(bytes))
        }
        other => Err(WorkshopError::Codec(format!(
            "unknown public key type {other}"
        ))),
    }
}

fn trimmed(code: &[u8]) -> String {
    String::from_utf8_lossy(code)
        .trim_end_matches('\0')
        .to_string()
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Native => f.write_str("native"),
            _ => write!(f, "{}:{}", self.code(), self.issuer().unwrap()),
        }
    }
}

impl fmt::Debug for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Asset({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;

    #[test]
    fn code_length_selects_the_variant() {
        let issuer = Keypair::random().public_key();
        assert!(matches!(
            Asset::new("RIO", issuer).unwrap(),
            Asset::CreditAlphanum4 { .. }
        ));
        assert!(matches!(
            Asset::new("LONGCODE", issuer).unwrap(),
            Asset::CreditAlphanum12 { .. }
        ));
        assert!(Asset::new("", issuer).is_err());
        assert!(Asset::new("WAY-TOO-LONG-CODE", issuer).is_err());
        assert!(Asset::new("BAD!", issuer).is_err());
    }

    #[test]
    fn native_sorts_first() {
        let issuer = Keypair::random().public_key();
        let rio = Asset::new("RIO", issuer).unwrap();
        let long = Asset::new("LONGCODE", issuer).unwrap();
        assert_eq!(Asset::native().canonical_cmp(&rio), Ordering::Less);
        assert_eq!(rio.canonical_cmp(&long), Ordering::Less);
        assert_eq!(rio.canonical_cmp(&rio), Ordering::Equal);
    }

    #[test]
    fn same_code_orders_by_issuer() {
        let a = PublicKey([1u8; 32]);
        let b = PublicKey([2u8; 32]);
        let first = Asset::new("SAT", a).unwrap();
        let second = Asset::new("SAT", b).unwrap();
        assert_eq!(first.canonical_cmp(&second), Ordering::Less);
    }

    #[test]
    fn xdr_round_trip() {
        let issuer = Keypair::random().public_key();
        for asset in [
            Asset::native(),
            Asset::new("RIO", issuer).unwrap(),
            Asset::new("LONGCODE", issuer).unwrap(),
        ] {
            let mut w = Writer::new();
            asset.write_xdr(&mut w);
            let bytes = w.into_bytes();
            let mut r = Reader::new(&bytes);
            assert_eq!(Asset::read_xdr(&mut r).unwrap(), asset);
        }
    }
}
