//! Read-only chain RPC used by the balance preflight.
//!
//! The preflight only ever reads: balances, gas prices, gas estimates and
//! ERC-20 balances. Each VM family gets its own trait so tests can stand in
//! for a chain without a node.

mod evm;
mod solana;

pub use evm::AlloyEvmRpc;
pub use solana::SolanaJsonRpc;

use crate::chain::{Chain, VmFamily};
use crate::config::FeeConfig;
use crate::error::{Error, Result};
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Read access to an EVM chain.
#[async_trait]
pub trait EvmRpc: Send + Sync {
    /// Native balance in wei.
    async fn balance(&self, account: Address) -> Result<U256>;

    /// Current gas price in wei.
    async fn gas_price(&self) -> Result<u128>;

    /// Gas units needed to send `value` from `from` to `to`.
    async fn estimate_transfer_gas(&self, from: Address, to: Address, value: U256) -> Result<u64>;

    /// ERC-20 `balanceOf(account)` on `token`.
    async fn erc20_balance(&self, token: Address, account: Address) -> Result<U256>;
}

/// Read access to a Solana cluster.
#[async_trait]
pub trait SolanaRpc: Send + Sync {
    /// Balance in lamports.
    async fn balance(&self, account: &str) -> Result<u64>;
}

/// Resolves RPC clients for origin chains.
pub trait OriginRpcs: Send + Sync {
    /// Client for an EVM origin chain.
    ///
    /// # Errors
    ///
    /// Returns an error if the chain is not an EVM chain or its endpoint is
    /// unusable.
    fn evm(&self, chain: Chain) -> Result<Arc<dyn EvmRpc>>;

    /// Client for a Solana origin chain.
    ///
    /// # Errors
    ///
    /// Returns an error if the chain is not a Solana cluster.
    fn solana(&self, chain: Chain) -> Result<Arc<dyn SolanaRpc>>;
}

/// Origin RPC clients over HTTP, one per chain, built on first use.
pub struct HttpOriginRpcs {
    endpoints: HashMap<Chain, String>,
    timeout: Duration,
    evm: Mutex<HashMap<Chain, Arc<dyn EvmRpc>>>,
    solana: Mutex<HashMap<Chain, Arc<dyn SolanaRpc>>>,
}

impl HttpOriginRpcs {
    /// Build from configuration; endpoints come from the override table or
    /// each chain's default RPC.
    #[must_use]
    pub fn new(config: &FeeConfig) -> Self {
        let endpoints = Chain::ALL
            .into_iter()
            .map(|chain| (chain, config.origin_rpc_url(chain)))
            .collect();

        Self {
            endpoints,
            timeout: Duration::from_secs(config.price_feed.request_timeout_secs),
            evm: Mutex::new(HashMap::new()),
            solana: Mutex::new(HashMap::new()),
        }
    }

    fn endpoint(&self, chain: Chain) -> String {
        self.endpoints
            .get(&chain)
            .cloned()
            .unwrap_or_else(|| chain.metadata().default_rpc.to_string())
    }
}

impl OriginRpcs for HttpOriginRpcs {
    fn evm(&self, chain: Chain) -> Result<Arc<dyn EvmRpc>> {
        if chain.vm() != VmFamily::Evm {
            return Err(Error::Rpc(format!("{chain} is not an EVM chain")));
        }

        let mut clients = self.evm.lock();
        if let Some(client) = clients.get(&chain) {
            return Ok(Arc::clone(client));
        }

        let url = self.endpoint(chain);
        debug!("Connecting EVM RPC for {chain} at {url}");
        let client: Arc<dyn EvmRpc> = Arc::new(AlloyEvmRpc::new(&[url])?);
        clients.insert(chain, Arc::clone(&client));
        Ok(client)
    }

    fn solana(&self, chain: Chain) -> Result<Arc<dyn SolanaRpc>> {
        if chain.vm() != VmFamily::Solana {
            return Err(Error::Rpc(format!("{chain} is not a Solana cluster")));
        }

        let mut clients = self.solana.lock();
        if let Some(client) = clients.get(&chain) {
            return Ok(Arc::clone(client));
        }

        let url = self.endpoint(chain);
        debug!("Connecting Solana RPC for {chain} at {url}");
        let client: Arc<dyn SolanaRpc> = Arc::new(SolanaJsonRpc::new(url, self.timeout));
        clients.insert(chain, Arc::clone(&client));
        Ok(client)
    }
}
