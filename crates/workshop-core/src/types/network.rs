use sha2::{Digest, Sha256};

/// A Stellar network, identified by its passphrase. The network ID (the
/// SHA-256 of the passphrase) is mixed into transaction signature payloads
/// and contract address derivation, so transactions cannot replay across
/// networks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    passphrase: String,
}

impl Network {
    pub const TESTNET_PASSPHRASE: &'static str = "Test SDF Network ; September 2015";
    pub const PUBLIC_PASSPHRASE: &'static str = "Public Global Stellar Network ; September 2015";

    pub fn testnet() -> Self {
        Self::from_passphrase(Self::TESTNET_PASSPHRASE)
    }

    pub fn from_passphrase(passphrase: &str) -> Self {
        Network {
            passphrase: passphrase.to_string(),
        }
    }

    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }

    pub fn id(&self) -> [u8; 32] {
        Sha256::digest(self.passphrase.as_bytes()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_id_is_deterministic_and_passphrase_scoped() {
        let testnet = Network::testnet();
        assert_eq!(testnet.id(), Network::testnet().id());
        assert_ne!(
            testnet.id(),
            Network::from_passphrase(Network::PUBLIC_PASSPHRASE).id()
        );
    }
}
