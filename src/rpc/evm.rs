//! EVM RPC over HTTP using alloy providers.

use super::EvmRpc;
use crate::error::{Error, Result};
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use alloy::transports::http::reqwest::Url;
use async_trait::async_trait;
use std::future::Future;
use tracing::{debug, warn};

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
    }
}

/// EVM RPC client with ordered endpoint fallback.
///
/// Every call is tried against each endpoint in turn until one answers.
#[derive(Clone)]
pub struct AlloyEvmRpc {
    providers: Vec<(String, DynProvider)>,
}

impl AlloyEvmRpc {
    /// Build a client over `urls`, tried in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the list is empty or a URL is malformed.
    pub fn new(urls: &[String]) -> Result<Self> {
        if urls.is_empty() {
            return Err(Error::Config("no RPC endpoints configured".to_string()));
        }

        let providers = urls
            .iter()
            .map(|url| {
                let parsed = url
                    .parse::<Url>()
                    .map_err(|e| Error::Config(format!("invalid RPC URL {url}: {e}")))?;
                let provider = ProviderBuilder::new().connect_http(parsed).erased();
                Ok((url.clone(), provider))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { providers })
    }

    async fn first_ok<T, F, Fut>(&self, what: &str, call: F) -> Result<T>
    where
        F: Fn(DynProvider) -> Fut,
        Fut: Future<Output = std::result::Result<T, String>>,
    {
        let mut last_error = String::new();
        for (url, provider) in &self.providers {
            match call(provider.clone()).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!("{what} failed on {url}: {e}");
                    last_error = e;
                }
            }
        }
        Err(Error::Rpc(format!("{what} failed on every endpoint: {last_error}")))
    }
}

#[async_trait]
impl EvmRpc for AlloyEvmRpc {
    async fn balance(&self, account: Address) -> Result<U256> {
        debug!("eth_getBalance {account}");
        self.first_ok("eth_getBalance", |provider| async move {
            provider.get_balance(account).await.map_err(|e| e.to_string())
        })
        .await
    }

    async fn gas_price(&self) -> Result<u128> {
        self.first_ok("eth_gasPrice", |provider| async move {
            provider.get_gas_price().await.map_err(|e| e.to_string())
        })
        .await
    }

    async fn estimate_transfer_gas(&self, from: Address, to: Address, value: U256) -> Result<u64> {
        let tx = TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_value(value);
        self.first_ok("eth_estimateGas", |provider| {
            let tx = tx.clone();
            async move { provider.estimate_gas(tx).await.map_err(|e| e.to_string()) }
        })
        .await
    }

    async fn erc20_balance(&self, token: Address, account: Address) -> Result<U256> {
        debug!("balanceOf {account} on {token}");
        self.first_ok("balanceOf", |provider| async move {
            IERC20::new(token, provider)
                .balanceOf(account)
                .call()
                .await
                .map_err(|e| e.to_string())
        })
        .await
    }
}
