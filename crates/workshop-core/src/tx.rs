//! Transaction model: an ordered list of operations plus fee and expiry,
//! built, signed, submitted, and discarded once a result is observed.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use sha2::{Digest, Sha256};

use crate::crypto::{Keypair, PublicKey, Signature};
use crate::error::{Result, WorkshopError};
use crate::types::{
    read_account_id, write_account_id, Amount, Asset, Network, PoolId, PoolParameters, Price,
    TxHash,
};
use crate::xdr::{Reader, Writer};

/// Base fee per operation, in stroops.
pub const BASE_FEE: u32 = 100;

/// Default transaction validity window in seconds.
pub const DEFAULT_TX_TIMEOUT_SECS: u64 = 30;

const ENVELOPE_TYPE_TX: u32 = 2;
const PRECOND_TIME: u32 = 1;
const MEMO_NONE: u32 = 0;

const OP_PAYMENT: u32 = 1;
const OP_SET_OPTIONS: u32 = 5;
const OP_CHANGE_TRUST: u32 = 6;
const OP_PATH_PAYMENT_STRICT_SEND: u32 = 13;
const OP_LIQUIDITY_POOL_DEPOSIT: u32 = 22;
const OP_INVOKE_HOST_FUNCTION: u32 = 24;

const ASSET_TYPE_POOL_SHARE: u32 = 3;
const HOST_FUNCTION_TYPE_CREATE_CONTRACT: u32 = 1;
const CONTRACT_ID_PREIMAGE_FROM_ASSET: u32 = 1;
const CONTRACT_EXECUTABLE_STELLAR_ASSET: u32 = 1;

/// What a trustline can point at: a credit asset or a pool-share line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustAsset {
    Asset(Asset),
    PoolShare(PoolParameters),
}

impl TrustAsset {
    fn write_xdr(&self, w: &mut Writer) {
        match self {
            TrustAsset::Asset(asset) => asset.write_xdr(w),
            TrustAsset::PoolShare(params) => {
                w.write_u32(ASSET_TYPE_POOL_SHARE);
                params.write_xdr(w);
            }
        }
    }

    fn read_xdr(r: &mut Reader<'_>) -> Result<Self> {
        if r.peek_u32()? == ASSET_TYPE_POOL_SHARE {
            r.read_u32()?;
            Ok(TrustAsset::PoolShare(PoolParameters::read_xdr(r)?))
        } else {
            Ok(TrustAsset::Asset(Asset::read_xdr(r)?))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Open (or raise) a trustline. `None` limit means the maximum.
    ChangeTrust {
        line: TrustAsset,
        limit: Option<Amount>,
    },
    Payment {
        destination: PublicKey,
        asset: Asset,
        amount: Amount,
    },
    /// Adjust signing weights. Setting the master weight to zero is a
    /// one-way door: the account can never authorize anything again.
    SetOptions {
        master_weight: Option<u8>,
        low_threshold: Option<u8>,
        med_threshold: Option<u8>,
        high_threshold: Option<u8>,
    },
    LiquidityPoolDeposit {
        pool_id: PoolId,
        max_amount_a: Amount,
        max_amount_b: Amount,
        min_price: Price,
        max_price: Price,
    },
    PathPaymentStrictSend {
        send_asset: Asset,
        send_amount: Amount,
        destination: PublicKey,
        dest_asset: Asset,
        dest_min: Amount,
        path: Vec<Asset>,
    },
    /// Deploy the built-in token contract for a classic asset.
    CreateAssetContract { asset: Asset },
}

impl Operation {
    fn write_xdr(&self, w: &mut Writer) {
        // Per-operation source account: always absent, the tx source applies.
        w.write_presence(false);
        match self {
            Operation::ChangeTrust { line, limit } => {
                w.write_u32(OP_CHANGE_TRUST);
                line.write_xdr(w);
                w.write_i64(limit.map_or(i64::MAX, |a| a.stroops()));
            }
            Operation::Payment {
                destination,
                asset,
                amount,
            } => {
                w.write_u32(OP_PAYMENT);
                write_account_id(w, destination);
                asset.write_xdr(w);
                w.write_i64(amount.stroops());
            }
            Operation::SetOptions {
                master_weight,
                low_threshold,
                med_threshold,
                high_threshold,
            } => {
                w.write_u32(OP_SET_OPTIONS);
                // inflation destination, clear flags, set flags: absent
                w.write_presence(false);
                w.write_presence(false);
                w.write_presence(false);
                for weight in [master_weight, low_threshold, med_threshold, high_threshold] {
                    match weight {
                        Some(v) => {
                            w.write_presence(true);
                            w.write_u32(*v as u32);
                        }
                        None => w.write_presence(false),
                    }
                }
                // home domain, signer: absent
                w.write_presence(false);
                w.write_presence(false);
            }
            Operation::LiquidityPoolDeposit {
                pool_id,
                max_amount_a,
                max_amount_b,
                min_price,
                max_price,
            } => {
                w.write_u32(OP_LIQUIDITY_POOL_DEPOSIT);
                w.write_opaque_fixed(&pool_id.0);
                w.write_i64(max_amount_a.stroops());
                w.write_i64(max_amount_b.stroops());
                w.write_i32(min_price.n);
                w.write_i32(min_price.d);
                w.write_i32(max_price.n);
                w.write_i32(max_price.d);
            }
            Operation::PathPaymentStrictSend {
                send_asset,
                send_amount,
                destination,
                dest_asset,
                dest_min,
                path,
            } => {
                w.write_u32(OP_PATH_PAYMENT_STRICT_SEND);
                send_asset.write_xdr(w);
                w.write_i64(send_amount.stroops());
                write_account_id(w, destination);
                dest_asset.write_xdr(w);
                w.write_i64(dest_min.stroops());
                w.write_u32(path.len() as u32);
                for hop in path {
                    hop.write_xdr(w);
                }
            }
            Operation::CreateAssetContract { asset } => {
                w.write_u32(OP_INVOKE_HOST_FUNCTION);
                w.write_u32(HOST_FUNCTION_TYPE_CREATE_CONTRACT);
                w.write_u32(CONTRACT_ID_PREIMAGE_FROM_ASSET);
                asset.write_xdr(w);
                w.write_u32(CONTRACT_EXECUTABLE_STELLAR_ASSET);
                // authorization entries
                w.write_u32(0);
            }
        }
    }

    fn read_xdr(r: &mut Reader<'_>) -> Result<Self> {
        if r.read_presence()? {
            return Err(WorkshopError::Codec(
                "per-operation source accounts are not supported".into(),
            ));
        }
        match r.read_u32()? {
            OP_CHANGE_TRUST => {
                let line = TrustAsset::read_xdr(r)?;
                let raw_limit = r.read_i64()?;
                let limit = if raw_limit == i64::MAX {
                    None
                } else {
                    Some(Amount::from_stroops(raw_limit)?)
                };
                Ok(Operation::ChangeTrust { line, limit })
            }
            OP_PAYMENT => Ok(Operation::Payment {
                destination: read_account_id(r)?,
                asset: Asset::read_xdr(r)?,
                amount: Amount::from_stroops(r.read_i64()?)?,
            }),
            OP_SET_OPTIONS => {
                for skipped in ["inflation destination", "clear flags", "set flags"] {
                    if r.read_presence()? {
                        return Err(WorkshopError::Codec(format!(
                            "unsupported set-options field: {skipped}"
                        )));
                    }
                }
                let mut weights = [None; 4];
                for slot in weights.iter_mut() {
                    if r.read_presence()? {
                        *slot = Some(r.read_u32()? as u8);
                    }
                }
                for skipped in ["home domain", "signer"] {
                    if r.read_presence()? {
                        return Err(WorkshopError::Codec(format!(
                            "unsupported set-options field: {skipped}"
                        )));
                    }
                }
                Ok(Operation::SetOptions {
                    master_weight: weights[0],
                    low_threshold: weights[1],
                    med_threshold: weights[2],
                    high_threshold: weights[3],
                })
            }
            OP_LIQUIDITY_POOL_DEPOSIT => {
                let pool_id = PoolId(r.read_opaque_fixed(32)?.try_into().unwrap());
                let max_amount_a = Amount::from_stroops(r.read_i64()?)?;
                let max_amount_b = Amount::from_stroops(r.read_i64()?)?;
                let min_price = Price::new(r.read_i32()?, r.read_i32()?)?;
                let max_price = Price::new(r.read_i32()?, r.read_i32()?)?;
                Ok(Operation::LiquidityPoolDeposit {
                    pool_id,
                    max_amount_a,
                    max_amount_b,
                    min_price,
                    max_price,
                })
            }
            OP_PATH_PAYMENT_STRICT_SEND => {
                let send_asset = Asset::read_xdr(r)?;
                let send_amount = Amount::from_stroops(r.read_i64()?)?;
                let destination = read_account_id(r)?;
                let dest_asset = Asset::read_xdr(r)?;
                let dest_min = Amount::from_stroops(r.read_i64()?)?;
                let hops = r.read_u32()? as usize;
                let mut path = Vec::with_capacity(hops);
                for _ in 0..hops {
                    path.push(Asset::read_xdr(r)?);
                }
                Ok(Operation::PathPaymentStrictSend {
                    send_asset,
                    send_amount,
                    destination,
                    dest_asset,
                    dest_min,
                    path,
                })
            }
            OP_INVOKE_HOST_FUNCTION => {
                match r.read_u32()? {
                    HOST_FUNCTION_TYPE_CREATE_CONTRACT => {}
                    other => {
                        return Err(WorkshopError::Codec(format!(
                            "unsupported host function type {other}"
                        )))
                    }
                }
                match r.read_u32()? {
                    CONTRACT_ID_PREIMAGE_FROM_ASSET => {}
                    other => {
                        return Err(WorkshopError::Codec(format!(
                            "unsupported contract id preimage {other}"
                        )))
                    }
                }
                let asset = Asset::read_xdr(r)?;
                match r.read_u32()? {
                    CONTRACT_EXECUTABLE_STELLAR_ASSET => {}
                    other => {
                        return Err(WorkshopError::Codec(format!(
                            "unsupported contract executable {other}"
                        )))
                    }
                }
                let auth_len = r.read_u32()?;
                if auth_len != 0 {
                    return Err(WorkshopError::Codec(
                        "authorization entries are not supported".into(),
                    ));
                }
                Ok(Operation::CreateAssetContract { asset })
            }
            other => Err(WorkshopError::Codec(format!(
                "unknown operation type {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBounds {
    pub min_time: u64,
    pub max_time: u64,
}

/// A built, unsigned transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub source: PublicKey,
    pub fee: u32,
    pub seq_num: i64,
    pub time_bounds: TimeBounds,
    pub operations: Vec<Operation>,
}

impl Transaction {
    fn write_xdr(&self, w: &mut Writer) {
        write_account_id(w, &self.source);
        w.write_u32(self.fee);
        w.write_i64(self.seq_num);
        w.write_u32(PRECOND_TIME);
        w.write_u64(self.time_bounds.min_time);
        w.write_u64(self.time_bounds.max_time);
        w.write_u32(MEMO_NONE);
        w.write_u32(self.operations.len() as u32);
        for op in &self.operations {
            op.write_xdr(w);
        }
        // extension point
        w.write_u32(0);
    }

    fn read_xdr(r: &mut Reader<'_>) -> Result<Self> {
        let source = read_account_id(r)?;
        let fee = r.read_u32()?;
        let seq_num = r.read_i64()?;
        match r.read_u32()? {
            PRECOND_TIME => {}
            other => {
                return Err(WorkshopError::Codec(format!(
                    "unsupported precondition type {other}"
                )))
            }
        }
        let time_bounds = TimeBounds {
            min_time: r.read_u64()?,
            max_time: r.read_u64()?,
        };
        match r.read_u32()? {
            MEMO_NONE => {}
            other => {
                return Err(WorkshopError::Codec(format!("unsupported memo type {other}")))
            }
        }
        let count = r.read_u32()? as usize;
        let mut operations = Vec::with_capacity(count);
        for _ in 0..count {
            operations.push(Operation::read_xdr(r)?);
        }
        match r.read_u32()? {
            0 => {}
            other => {
                return Err(WorkshopError::Codec(format!(
                    "unsupported transaction extension {other}"
                )))
            }
        }
        Ok(Transaction {
            source,
            fee,
            seq_num,
            time_bounds,
            operations,
        })
    }

    /// The signature payload hash: SHA-256 over the network ID, the envelope
    /// type tag and the transaction body.
    pub fn hash(&self, network: &Network) -> TxHash {
        let mut w = Writer::new();
        w.write_opaque_fixed(&network.id());
        w.write_u32(ENVELOPE_TYPE_TX);
        self.write_xdr(&mut w);
        TxHash(Sha256::digest(w.into_bytes()).into())
    }

    pub fn sign(self, network: &Network, signers: &[&Keypair]) -> SignedTransaction {
        let mut signed = SignedTransaction {
            tx: self,
            signatures: Vec::with_capacity(signers.len()),
        };
        for keypair in signers {
            signed.add_signature(network, keypair);
        }
        signed
    }

    /// Encode without signatures, as the aggregator build endpoint returns.
    pub fn to_unsigned_envelope_base64(&self) -> String {
        SignedTransaction {
            tx: self.clone(),
            signatures: Vec::new(),
        }
        .to_envelope_base64()
    }
}

/// A signature plus the last four bytes of the signing key, so a validator
/// can pick the right key without trying all of them.
#[derive(Debug, Clone)]
pub struct DecoratedSignature {
    pub hint: [u8; 4],
    pub signature: Signature,
}

/// A transaction envelope: the transaction and any signatures collected so
/// far. Envelopes returned unsigned by external builders are decoded into
/// this form, signed locally, and re-encoded.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub tx: Transaction,
    pub signatures: Vec<DecoratedSignature>,
}

impl SignedTransaction {
    pub fn hash(&self, network: &Network) -> TxHash {
        self.tx.hash(network)
    }

    pub fn add_signature(&mut self, network: &Network, keypair: &Keypair) {
        let hash = self.tx.hash(network);
        self.signatures.push(DecoratedSignature {
            hint: keypair.public_key().hint(),
            signature: keypair.sign(&hash.0),
        });
    }

    /// Check whether any attached signature is a valid signature by `key`
    /// over this transaction's hash.
    pub fn is_signed_by(&self, network: &Network, key: &PublicKey) -> bool {
        let hash = self.tx.hash(network);
        self.signatures
            .iter()
            .any(|ds| ds.hint == key.hint() && key.verify(&hash.0, &ds.signature))
    }

    pub fn to_envelope_base64(&self) -> String {
        let mut w = Writer::new();
        w.write_u32(ENVELOPE_TYPE_TX);
        self.tx.write_xdr(&mut w);
        w.write_u32(self.signatures.len() as u32);
        for ds in &self.signatures {
            w.write_opaque_fixed(&ds.hint);
            w.write_opaque_var(&ds.signature.0);
        }
        BASE64.encode(w.into_bytes())
    }

    pub fn from_envelope_base64(envelope: &str) -> Result<Self> {
        let bytes = BASE64
            .decode(envelope.trim())
            .map_err(|e| WorkshopError::Codec(format!("invalid envelope base64: {e}")))?;
        let mut r = Reader::new(&bytes);
        match r.read_u32()? {
            ENVELOPE_TYPE_TX => {}
            other => {
                return Err(WorkshopError::Codec(format!(
                    "unsupported envelope type {other}"
                )))
            }
        }
        let tx = Transaction::read_xdr(&mut r)?;
        let count = r.read_u32()? as usize;
        let mut signatures = Vec::with_capacity(count);
        for _ in 0..count {
            let hint: [u8; 4] = r.read_opaque_fixed(4)?.try_into().unwrap();
            let sig = r.read_opaque_var()?;
            let sig: [u8; 64] = sig
                .try_into()
                .map_err(|_| WorkshopError::Codec("signature must be 64 bytes".into()))?;
            signatures.push(DecoratedSignature {
                hint,
                signature: Signature(sig),
            });
        }
        if !r.is_exhausted() {
            return Err(WorkshopError::Codec("trailing envelope bytes".into()));
        }
        Ok(SignedTransaction { tx, signatures })
    }
}

/// Builder over a loaded account's current sequence number. The built
/// transaction consumes `current_seq + 1`.
pub struct TransactionBuilder {
    source: PublicKey,
    current_seq: i64,
    base_fee: u32,
    timeout_secs: u64,
    operations: Vec<Operation>,
}

impl TransactionBuilder {
    pub fn new(source: PublicKey, current_seq: i64) -> Self {
        Self {
            source,
            current_seq,
            base_fee: BASE_FEE,
            timeout_secs: DEFAULT_TX_TIMEOUT_SECS,
            operations: Vec::new(),
        }
    }

    pub fn with_base_fee(mut self, base_fee: u32) -> Self {
        self.base_fee = base_fee;
        self
    }

    pub fn add_operation(mut self, op: Operation) -> Self {
        self.operations.push(op);
        self
    }

    pub fn set_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn build(self) -> Result<Transaction> {
        if self.operations.is_empty() {
            return Err(WorkshopError::InvalidConfig(
                "a transaction needs at least one operation".into(),
            ));
        }
        let fee = self.base_fee * self.operations.len() as u32;
        Ok(Transaction {
            source: self.source,
            fee,
            seq_num: self
                .current_seq
                .checked_add(1)
                .ok_or_else(|| WorkshopError::InvalidConfig("sequence overflow".into()))?,
            time_bounds: TimeBounds {
                min_time: 0,
                max_time: now_secs() + self.timeout_secs,
            },
            operations: self.operations,
        })
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
