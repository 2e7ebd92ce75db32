//! Minimal Solana JSON-RPC client: `getBalance` only.

use super::SolanaRpc;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct BalanceResult {
    value: u64,
}

/// Solana RPC over HTTP JSON-RPC.
#[derive(Debug, Clone)]
pub struct SolanaJsonRpc {
    url: String,
    client: reqwest::Client,
}

impl SolanaJsonRpc {
    /// Create a client for the cluster at `url`.
    #[must_use]
    pub fn new(url: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { url, client }
    }
}

#[async_trait]
impl SolanaRpc for SolanaJsonRpc {
    async fn balance(&self, account: &str) -> Result<u64> {
        debug!("getBalance {account} via {}", self.url);
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getBalance",
            "params": [account, { "commitment": "confirmed" }],
        });

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Rpc(format!("getBalance request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Rpc(format!(
                "getBalance returned status: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Rpc(format!("failed to read getBalance response: {e}")))?;
        parse_balance_response(&body)
    }
}

fn parse_balance_response(body: &str) -> Result<u64> {
    let response: RpcResponse<BalanceResult> = serde_json::from_str(body)
        .map_err(|e| Error::Serialization(format!("invalid getBalance response: {e}")))?;

    if let Some(error) = response.error {
        return Err(Error::Rpc(format!(
            "getBalance error {}: {}",
            error.code, error.message
        )));
    }

    response
        .result
        .map(|result| result.value)
        .ok_or_else(|| Error::Rpc("getBalance returned no result".to_string()))
}
