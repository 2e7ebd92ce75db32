//! In-memory stand-ins for the price feed and chain RPCs.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use parking_lot::Mutex;
use pushcampus_fees::clock::ManualClock;
use pushcampus_fees::config::FailMode;
use pushcampus_fees::pricing::PriceSource;
use pushcampus_fees::rpc::{EvmRpc, OriginRpcs, SolanaRpc};
use pushcampus_fees::{Chain, Error, FeeConfig, FeeEngine, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const TREASURY: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595916Da2";
pub const PAYER: &str = "0x00000000000000000000000000000000000000aa";

/// Price feed whose quotes can be changed or knocked out mid-test.
#[derive(Default)]
pub struct TestPriceFeed {
    prices: Mutex<HashMap<String, f64>>,
    requests: AtomicUsize,
}

impl TestPriceFeed {
    pub fn set(&self, id: &str, price: f64) {
        self.prices.lock().insert(id.to_string(), price);
    }

    pub fn remove(&self, id: &str) {
        self.prices.lock().remove(id);
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for TestPriceFeed {
    async fn fetch_usd_price(&self, id: &str) -> Result<f64> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.prices
            .lock()
            .get(id)
            .copied()
            .ok_or_else(|| Error::PriceFeed(format!("HTTP 429 for {id}")))
    }
}

/// EVM chain with per-account balances and a fixed gas price.
#[derive(Default)]
pub struct TestEvmChain {
    balances: Mutex<HashMap<Address, U256>>,
    gas_price: u128,
    offline: bool,
}

impl TestEvmChain {
    pub fn with_gas_price(gas_price: u128) -> Self {
        Self {
            gas_price,
            ..Self::default()
        }
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    pub fn fund(&self, account: Address, amount: U256) {
        self.balances.lock().insert(account, amount);
    }

    fn check_online(&self) -> Result<()> {
        if self.offline {
            return Err(Error::Rpc("all endpoints failed".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl EvmRpc for TestEvmChain {
    async fn balance(&self, account: Address) -> Result<U256> {
        self.check_online()?;
        Ok(self.balances.lock().get(&account).copied().unwrap_or_default())
    }

    async fn gas_price(&self) -> Result<u128> {
        self.check_online()?;
        Ok(self.gas_price)
    }

    async fn estimate_transfer_gas(&self, _from: Address, _to: Address, _value: U256) -> Result<u64> {
        self.check_online()?;
        Ok(21_000)
    }

    async fn erc20_balance(&self, _token: Address, _account: Address) -> Result<U256> {
        self.check_online()?;
        Ok(U256::ZERO)
    }
}

/// Solana cluster with per-account lamport balances.
#[derive(Default)]
pub struct TestSolanaCluster {
    lamports: Mutex<HashMap<String, u64>>,
}

impl TestSolanaCluster {
    pub fn fund(&self, account: &str, lamports: u64) {
        self.lamports.lock().insert(account.to_string(), lamports);
    }
}

#[async_trait]
impl SolanaRpc for TestSolanaCluster {
    async fn balance(&self, account: &str) -> Result<u64> {
        Ok(self.lamports.lock().get(account).copied().unwrap_or_default())
    }
}

/// Origin chains keyed by chain.
#[derive(Default)]
pub struct TestOrigins {
    pub evm: HashMap<Chain, Arc<TestEvmChain>>,
    pub solana: HashMap<Chain, Arc<TestSolanaCluster>>,
}

impl OriginRpcs for TestOrigins {
    fn evm(&self, chain: Chain) -> Result<Arc<dyn EvmRpc>> {
        self.evm
            .get(&chain)
            .map(|rpc| Arc::clone(rpc) as Arc<dyn EvmRpc>)
            .ok_or_else(|| Error::Rpc(format!("no RPC for {chain}")))
    }

    fn solana(&self, chain: Chain) -> Result<Arc<dyn SolanaRpc>> {
        self.solana
            .get(&chain)
            .map(|rpc| Arc::clone(rpc) as Arc<dyn SolanaRpc>)
            .ok_or_else(|| Error::Rpc(format!("no RPC for {chain}")))
    }
}

/// A fee engine wired to in-memory collaborators.
pub struct TestHarness {
    pub engine: FeeEngine,
    pub feed: Arc<TestPriceFeed>,
    pub push_chain: Arc<TestEvmChain>,
    pub clock: Arc<ManualClock>,
}

impl TestHarness {
    pub fn new(push_chain: TestEvmChain, origins: TestOrigins, fail_mode: FailMode) -> Self {
        let mut config = FeeConfig::default();
        config.fee.treasury_address = Some(TREASURY.to_string());
        config.preflight.fail_mode = fail_mode;

        let feed = Arc::new(TestPriceFeed::default());
        let push_chain = Arc::new(push_chain);
        let clock = Arc::new(ManualClock::new());
        let engine = FeeEngine::with_parts(
            &config,
            feed.clone(),
            push_chain.clone(),
            Arc::new(origins),
            clock.clone(),
        )
        .unwrap_or_else(|e| panic!("engine: {e}"));

        Self {
            engine,
            feed,
            push_chain,
            clock,
        }
    }
}
