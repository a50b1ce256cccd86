use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

use crate::crypto::strkey;
use crate::error::{Result, WorkshopError};
use crate::types::{Asset, Network};
use crate::xdr::Writer;

const ENVELOPE_TYPE_CONTRACT_ID: u32 = 8;
const CONTRACT_ID_PREIMAGE_FROM_ASSET: u32 = 1;

/// A Soroban contract address, displayed as a 'C...' strkey.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContractId(pub [u8; 32]);

impl ContractId {
    /// Derives the contract address the asset deploys to on the given
    /// network. Fully deterministic: hash of the network ID and the asset
    /// descriptor, no randomness.
    pub fn for_asset(network: &Network, asset: &Asset) -> Self {
        let mut w = Writer::new();
        w.write_u32(ENVELOPE_TYPE_CONTRACT_ID);
        w.write_opaque_fixed(&network.id());
        w.write_u32(CONTRACT_ID_PREIMAGE_FROM_ASSET);
        asset.write_xdr(&mut w);
        ContractId(Sha256::digest(w.into_bytes()).into())
    }

    /// Contract address of the native asset on the given network.
    pub fn native(network: &Network) -> Self {
        Self::for_asset(network, &Asset::native())
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&strkey::encode(strkey::Version::Contract, &self.0))
    }
}

impl fmt::Debug for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContractId({self})")
    }
}

impl FromStr for ContractId {
    type Err = WorkshopError;

    fn from_str(s: &str) -> Result<Self> {
        strkey::decode(strkey::Version::Contract, s).map(ContractId)
    }
}
