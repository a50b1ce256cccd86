mod keys;
pub mod strkey;

pub use keys::{Keypair, PublicKey, Signature};
