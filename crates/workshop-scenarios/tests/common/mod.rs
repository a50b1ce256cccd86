//! In-memory doubles for the three external services. The ledger double
//! enforces the rules the workflows depend on: trustlines before payments,
//! signing weights, deposit price bands and constant-product swaps.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use workshop_core::{
    Amount, Asset, Network, Operation, PoolId, PoolParameters, Price, PublicKey, Result,
    SignedTransaction, Transaction, TransactionBuilder, TrustAsset, TxHash, TxStatus,
    WorkshopError,
};
use workshop_horizon::{AccountRecord, BalanceLine, HorizonClient, SubmitResponse};
use workshop_soroban::SorobanClient;
use workshop_soroswap::{
    AddLiquidityRequest, BuildRequest, BuildResponse, Quote, QuoteRequest, SendResponse,
    SoroswapClient,
};

const FAUCET_UNITS: i64 = 10_000;

#[derive(Debug, Clone)]
struct DoubleAccount {
    sequence: i64,
    master_weight: u8,
    /// Signed stroops per asset. An issuer's balance of its own asset goes
    /// negative as supply is minted, so every asset sums to zero across
    /// accounts.
    balances: HashMap<Asset, i64>,
    trustlines: HashMap<Asset, i64>,
    pool_shares: HashMap<PoolId, i64>,
}

impl DoubleAccount {
    fn funded() -> Self {
        let mut balances = HashMap::new();
        balances.insert(Asset::native(), FAUCET_UNITS * 10_000_000);
        DoubleAccount {
            sequence: 0,
            master_weight: 1,
            balances,
            trustlines: HashMap::new(),
            pool_shares: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct PoolState {
    params: PoolParameters,
    reserve_a: i64,
    reserve_b: i64,
}

#[derive(Debug, Clone, Default)]
struct LedgerState {
    accounts: HashMap<PublicKey, DoubleAccount>,
    pools: HashMap<PoolId, PoolState>,
    ledger_seq: u32,
}

#[derive(Debug, Default)]
struct RpcState {
    script: VecDeque<TxStatus>,
    calls: usize,
}

/// Ledger double implementing both the Horizon and Soroban RPC boundaries.
pub struct LedgerDouble {
    network: Network,
    state: Mutex<LedgerState>,
    rpc: Mutex<RpcState>,
}

impl LedgerDouble {
    pub fn new() -> Self {
        Self {
            network: Network::testnet(),
            state: Mutex::new(LedgerState::default()),
            rpc: Mutex::new(RpcState::default()),
        }
    }

    /// Queue statuses for `get_transaction`; once drained it answers SUCCESS.
    #[allow(dead_code)]
    pub fn script_rpc_statuses(&self, statuses: Vec<TxStatus>) {
        self.rpc.lock().unwrap().script.extend(statuses);
    }

    #[allow(dead_code)]
    pub fn rpc_calls(&self) -> usize {
        self.rpc.lock().unwrap().calls
    }

    /// Signed balance in stroops; negative for an issuer's minted supply.
    pub fn raw_balance(&self, account: &PublicKey, asset: &Asset) -> i64 {
        self.state
            .lock()
            .unwrap()
            .accounts
            .get(account)
            .and_then(|a| a.balances.get(asset).copied())
            .unwrap_or(0)
    }

    pub fn pool_reserves(&self, id: &PoolId) -> Option<(i64, i64)> {
        self.state
            .lock()
            .unwrap()
            .pools
            .get(id)
            .map(|p| (p.reserve_a, p.reserve_b))
    }

    #[allow(dead_code)]
    pub fn all_reserves(&self) -> Vec<(i64, i64)> {
        self.state
            .lock()
            .unwrap()
            .pools
            .values()
            .map(|p| (p.reserve_a, p.reserve_b))
            .collect()
    }

    fn apply(&self, state: &mut LedgerState, tx: &Transaction) -> Result<()> {
        for op in &tx.operations {
            self.apply_op(state, tx.source, op)?;
        }
        Ok(())
    }

    fn apply_op(&self, state: &mut LedgerState, source: PublicKey, op: &Operation) -> Result<()> {
        match op {
            Operation::ChangeTrust { line, limit } => match line {
                TrustAsset::Asset(asset) => {
                    if asset.is_native() {
                        return Err(op_err("op_malformed"));
                    }
                    if asset.issuer() == Some(source) {
                        return Err(op_err("op_self_not_allowed"));
                    }
                    let account = state.accounts.get_mut(&source).unwrap();
                    account
                        .trustlines
                        .insert(*asset, limit.map_or(i64::MAX, |a| a.stroops()));
                    Ok(())
                }
                TrustAsset::PoolShare(params) => {
                    let account = state.accounts.get(&source).unwrap();
                    for asset in [params.asset_a(), params.asset_b()] {
                        let trusted = asset.is_native()
                            || asset.issuer() == Some(source)
                            || account.trustlines.contains_key(&asset);
                        if !trusted {
                            return Err(op_err("op_no_trust"));
                        }
                    }
                    let id = params.id();
                    state
                        .accounts
                        .get_mut(&source)
                        .unwrap()
                        .pool_shares
                        .entry(id)
                        .or_insert(0);
                    state.pools.entry(id).or_insert(PoolState {
                        params: *params,
                        reserve_a: 0,
                        reserve_b: 0,
                    });
                    Ok(())
                }
            },
            Operation::Payment {
                destination,
                asset,
                amount,
            } => {
                self.debit(state, source, *asset, amount.stroops())?;
                self.credit(state, *destination, *asset, amount.stroops())
            }
            Operation::SetOptions {
                master_weight,
                low_threshold: _,
                med_threshold: _,
                high_threshold: _,
            } => {
                let account = state.accounts.get_mut(&source).unwrap();
                if let Some(weight) = master_weight {
                    account.master_weight = *weight;
                }
                Ok(())
            }
            Operation::LiquidityPoolDeposit {
                pool_id,
                max_amount_a,
                max_amount_b,
                min_price,
                max_price,
            } => self.deposit(
                state,
                source,
                *pool_id,
                max_amount_a.stroops(),
                max_amount_b.stroops(),
                *min_price,
                *max_price,
            ),
            Operation::PathPaymentStrictSend {
                send_asset,
                send_amount,
                destination,
                dest_asset,
                dest_min,
                path,
            } => {
                if !path.is_empty() {
                    return Err(op_err("op_too_few_offers"));
                }
                self.path_payment(
                    state,
                    source,
                    *send_asset,
                    send_amount.stroops(),
                    *destination,
                    *dest_asset,
                    dest_min.stroops(),
                )
            }
            Operation::CreateAssetContract { .. } => Ok(()),
        }
    }

    fn debit(
        &self,
        state: &mut LedgerState,
        from: PublicKey,
        asset: Asset,
        stroops: i64,
    ) -> Result<()> {
        let is_issuer = asset.issuer() == Some(from);
        let account = state.accounts.get_mut(&from).unwrap();
        if !asset.is_native() && !is_issuer && !account.trustlines.contains_key(&asset) {
            return Err(op_err("op_src_no_trust"));
        }
        let balance = account.balances.entry(asset).or_insert(0);
        // Issuers mint: their own-asset balance may go negative.
        if !is_issuer && *balance < stroops {
            return Err(op_err("op_underfunded"));
        }
        *balance -= stroops;
        Ok(())
    }

    fn credit(
        &self,
        state: &mut LedgerState,
        to: PublicKey,
        asset: Asset,
        stroops: i64,
    ) -> Result<()> {
        let is_issuer = asset.issuer() == Some(to);
        let account = state
            .accounts
            .get_mut(&to)
            .ok_or_else(|| op_err("op_no_destination"))?;
        if !asset.is_native() && !is_issuer {
            let limit = *account
                .trustlines
                .get(&asset)
                .ok_or_else(|| op_err("op_no_trust"))?;
            let balance = account.balances.get(&asset).copied().unwrap_or(0);
            if balance + stroops > limit {
                return Err(op_err("op_line_full"));
            }
        }
        *account.balances.entry(asset).or_insert(0) += stroops;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn deposit(
        &self,
        state: &mut LedgerState,
        source: PublicKey,
        pool_id: PoolId,
        max_a: i64,
        max_b: i64,
        min_price: Price,
        max_price: Price,
    ) -> Result<()> {
        if !state
            .accounts
            .get(&source)
            .unwrap()
            .pool_shares
            .contains_key(&pool_id)
        {
            return Err(op_err("op_no_trust"));
        }
        let pool = state
            .pools
            .get(&pool_id)
            .cloned()
            .ok_or_else(|| op_err("op_no_trust"))?;

        let (dep_a, dep_b) = if pool.reserve_a == 0 || pool.reserve_b == 0 {
            if !ratio_in_band(max_a, max_b, min_price, max_price) {
                return Err(op_err("op_bad_price"));
            }
            (max_a, max_b)
        } else {
            if !ratio_in_band(pool.reserve_a, pool.reserve_b, min_price, max_price) {
                return Err(op_err("op_bad_price"));
            }
            // Deposit at the pool's current ratio, bounded by both maxima.
            let by_b = (max_b as i128 * pool.reserve_a as i128 / pool.reserve_b as i128) as i64;
            let dep_a = max_a.min(by_b);
            let dep_b = (dep_a as i128 * pool.reserve_b as i128 / pool.reserve_a as i128) as i64;
            (dep_a, dep_b)
        };

        self.debit(state, source, pool.params.asset_a(), dep_a)?;
        self.debit(state, source, pool.params.asset_b(), dep_b)?;

        let minted = ((dep_a as i128 * dep_b as i128) as f64).sqrt() as i64;
        let pool = state.pools.get_mut(&pool_id).unwrap();
        pool.reserve_a += dep_a;
        pool.reserve_b += dep_b;
        *state
            .accounts
            .get_mut(&source)
            .unwrap()
            .pool_shares
            .get_mut(&pool_id)
            .unwrap() += minted;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn path_payment(
        &self,
        state: &mut LedgerState,
        source: PublicKey,
        send_asset: Asset,
        send_stroops: i64,
        destination: PublicKey,
        dest_asset: Asset,
        dest_min: i64,
    ) -> Result<()> {
        let pool = state
            .pools
            .values()
            .find(|p| {
                let (a, b) = (p.params.asset_a(), p.params.asset_b());
                (a == send_asset && b == dest_asset) || (a == dest_asset && b == send_asset)
            })
            .cloned()
            .ok_or_else(|| op_err("op_too_few_offers"))?;

        let forward = pool.params.asset_a() == send_asset;
        let (reserve_in, reserve_out) = if forward {
            (pool.reserve_a, pool.reserve_b)
        } else {
            (pool.reserve_b, pool.reserve_a)
        };
        if reserve_in == 0 || reserve_out == 0 {
            return Err(op_err("op_too_few_offers"));
        }

        // Constant product with the pool fee applied on the way in.
        let fee = pool.params.fee_bps() as i128;
        let in_less_fee = send_stroops as i128 * (10_000 - fee);
        let out =
            (reserve_out as i128 * in_less_fee / (reserve_in as i128 * 10_000 + in_less_fee)) as i64;
        if out < dest_min {
            return Err(op_err("op_under_destmin"));
        }

        self.debit(state, source, send_asset, send_stroops)?;
        self.credit(state, destination, dest_asset, out)?;

        let id = pool.params.id();
        let pool = state.pools.get_mut(&id).unwrap();
        if forward {
            pool.reserve_a += send_stroops;
            pool.reserve_b -= out;
        } else {
            pool.reserve_b += send_stroops;
            pool.reserve_a -= out;
        }
        Ok(())
    }
}

fn op_err(code: &str) -> WorkshopError {
    WorkshopError::Horizon(format!("submission rejected; operations: {code}"))
}

fn ratio_in_band(num: i64, den: i64, min: Price, max: Price) -> bool {
    if num <= 0 || den <= 0 {
        return false;
    }
    let ge_min = num as i128 * min.d as i128 >= min.n as i128 * den as i128;
    let le_max = num as i128 * max.d as i128 <= max.n as i128 * den as i128;
    ge_min && le_max
}

#[async_trait]
impl HorizonClient for LedgerDouble {
    async fn fund_account(&self, account: &PublicKey) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.accounts.contains_key(account) {
            return Err(WorkshopError::Faucet(format!(
                "account {account} is already funded"
            )));
        }
        state.accounts.insert(*account, DoubleAccount::funded());
        Ok(())
    }

    async fn load_account(&self, account: &PublicKey) -> Result<AccountRecord> {
        let state = self.state.lock().unwrap();
        let stored = state
            .accounts
            .get(account)
            .ok_or_else(|| WorkshopError::Horizon(format!("account {account} not found")))?;

        let mut balances = vec![BalanceLine::Native {
            balance: clamped_amount(stored.balances.get(&Asset::native()).copied().unwrap_or(0)),
        }];
        for asset in stored.trustlines.keys() {
            let balance = clamped_amount(stored.balances.get(asset).copied().unwrap_or(0));
            let line = match asset {
                Asset::CreditAlphanum4 { .. } => BalanceLine::CreditAlphanum4 {
                    balance,
                    asset_code: asset.code(),
                    asset_issuer: asset.issuer().unwrap(),
                },
                Asset::CreditAlphanum12 { .. } => BalanceLine::CreditAlphanum12 {
                    balance,
                    asset_code: asset.code(),
                    asset_issuer: asset.issuer().unwrap(),
                },
                Asset::Native => continue,
            };
            balances.push(line);
        }
        for (pool_id, shares) in &stored.pool_shares {
            balances.push(BalanceLine::LiquidityPoolShares {
                balance: clamped_amount(*shares),
                liquidity_pool_id: pool_id.to_string(),
            });
        }

        Ok(AccountRecord {
            account_id: *account,
            sequence: stored.sequence,
            balances,
        })
    }

    async fn submit_transaction(&self, signed: &SignedTransaction) -> Result<SubmitResponse> {
        let mut state = self.state.lock().unwrap();
        let tx = &signed.tx;
        let account = state
            .accounts
            .get(&tx.source)
            .ok_or_else(|| WorkshopError::Horizon("source account not found".into()))?;

        if account.master_weight == 0 || !signed.is_signed_by(&self.network, &tx.source) {
            return Err(WorkshopError::Horizon(
                "submission rejected; transaction: tx_bad_auth".into(),
            ));
        }
        if tx.seq_num != account.sequence + 1 {
            return Err(WorkshopError::Horizon(
                "submission rejected; transaction: tx_bad_seq".into(),
            ));
        }

        // Transactions are atomic: apply against a copy, commit on success.
        let mut working = state.clone();
        self.apply(&mut working, tx)?;
        working.accounts.get_mut(&tx.source).unwrap().sequence = tx.seq_num;
        working.ledger_seq += 1;
        let ledger = working.ledger_seq;
        *state = working;

        Ok(SubmitResponse {
            hash: signed.hash(&self.network),
            ledger: Some(ledger),
            successful: true,
        })
    }
}

#[async_trait]
impl SorobanClient for LedgerDouble {
    async fn prepare_transaction(&self, tx: &Transaction) -> Result<Transaction> {
        let mut prepared = tx.clone();
        prepared.fee += 100;
        Ok(prepared)
    }

    async fn send_transaction(&self, tx: &SignedTransaction) -> Result<TxHash> {
        if tx.signatures.is_empty() {
            return Err(WorkshopError::SorobanRpc(
                "send rejected: envelope is unsigned".into(),
            ));
        }
        Ok(tx.hash(&self.network))
    }

    async fn get_transaction(&self, _hash: &TxHash) -> Result<TxStatus> {
        let mut rpc = self.rpc.lock().unwrap();
        rpc.calls += 1;
        Ok(rpc.script.pop_front().unwrap_or(TxStatus::Success))
    }
}

#[derive(Debug, Default)]
struct AggState {
    reserve_in: i64,
    reserve_out: i64,
    calls: Vec<&'static str>,
}

/// Aggregator double with its own constant-product pool for quoting.
pub struct AggregatorDouble {
    network: Network,
    state: Mutex<AggState>,
}

impl AggregatorDouble {
    pub fn new() -> Self {
        Self {
            network: Network::testnet(),
            state: Mutex::new(AggState::default()),
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    #[allow(dead_code)]
    pub fn reserves(&self) -> (i64, i64) {
        let state = self.state.lock().unwrap();
        (state.reserve_in, state.reserve_out)
    }

    /// A stand-in envelope carrying the trade for the named account; the
    /// flow only needs something decodable that can be signed locally.
    fn build_envelope(&self, account: &str, stroops: i64) -> Result<BuildResponse> {
        let source: PublicKey = account.parse()?;
        let tx = TransactionBuilder::new(source, 0)
            .add_operation(Operation::Payment {
                destination: source,
                asset: Asset::native(),
                amount: Amount::from_stroops(stroops)?,
            })
            .build()?;
        Ok(BuildResponse {
            xdr: tx.to_unsigned_envelope_base64(),
        })
    }
}

#[async_trait]
impl SoroswapClient for AggregatorDouble {
    async fn quote(&self, request: &QuoteRequest) -> Result<Quote> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("quote");
        let amount_in: i64 = request
            .amount
            .parse()
            .map_err(|_| WorkshopError::Aggregator("malformed amount".into()))?;
        let amount_out = if state.reserve_in > 0 && state.reserve_out > 0 {
            let in_less_fee = amount_in as i128 * 9_970;
            (state.reserve_out as i128 * in_less_fee
                / (state.reserve_in as i128 * 10_000 + in_less_fee)) as i64
        } else {
            // No pool yet: quote a fixed demo rate.
            amount_in * 125
        };
        Ok(Quote {
            amount_in: amount_in.to_string(),
            amount_out: amount_out.to_string(),
            price_impact_pct: Some("0.30".into()),
            platform: Some("soroswap".into()),
            rest: serde_json::Map::new(),
        })
    }

    async fn build(&self, request: &BuildRequest) -> Result<BuildResponse> {
        self.state.lock().unwrap().calls.push("build");
        let amount_out: i64 = request
            .quote
            .amount_out
            .parse()
            .map_err(|_| WorkshopError::Aggregator("malformed quote".into()))?;
        self.build_envelope(&request.from, amount_out)
    }

    async fn add_liquidity(&self, request: &AddLiquidityRequest) -> Result<BuildResponse> {
        let amount_a = {
            let mut state = self.state.lock().unwrap();
            state.calls.push("add_liquidity");
            let amount_a: i64 = request
                .amount_a
                .parse()
                .map_err(|_| WorkshopError::Aggregator("malformed amount".into()))?;
            let amount_b: i64 = request
                .amount_b
                .parse()
                .map_err(|_| WorkshopError::Aggregator("malformed amount".into()))?;
            state.reserve_in += amount_a;
            state.reserve_out += amount_b;
            amount_a
        };
        self.build_envelope(&request.to, amount_a)
    }

    async fn send(&self, signed_xdr: &str) -> Result<SendResponse> {
        self.state.lock().unwrap().calls.push("send");
        let envelope = SignedTransaction::from_envelope_base64(signed_xdr)?;
        if envelope.signatures.is_empty() {
            return Err(WorkshopError::Aggregator("envelope is unsigned".into()));
        }
        if !envelope.is_signed_by(&self.network, &envelope.tx.source) {
            return Err(WorkshopError::Aggregator(
                "envelope is not signed by its source account".into(),
            ));
        }
        Ok(SendResponse {
            hash: Some(envelope.hash(&self.network).to_string()),
            rest: serde_json::Map::new(),
        })
    }
}

fn clamped_amount(stroops: i64) -> Amount {
    Amount::from_stroops(stroops.max(0)).expect("non-negative after clamp")
}
