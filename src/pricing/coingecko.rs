//! USD price feed backed by the CoinGecko simple-price API.

use crate::config::PriceFeedConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// A source of spot USD prices keyed by price-feed id.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch the current USD price for `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload carries no usable
    /// price.
    async fn fetch_usd_price(&self, id: &str) -> Result<f64>;
}

#[derive(Debug, Deserialize)]
struct SimplePrice {
    usd: Option<f64>,
}

/// `{ "<id>": { "usd": <number> } }`
type SimplePriceResponse = HashMap<String, SimplePrice>;

/// Price source that queries `GET {base}/simple/price?ids=<id>&vs_currencies=usd`.
#[derive(Debug, Clone)]
pub struct CoinGeckoSource {
    base_url: String,
    client: reqwest::Client,
}

impl CoinGeckoSource {
    /// Build a source from configuration.
    #[must_use]
    pub fn new(config: &PriceFeedConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("pushcampus-fees/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// The endpoint queried for `id`.
    #[must_use]
    pub fn price_url(&self) -> String {
        format!("{}/simple/price", self.base_url)
    }
}

#[async_trait]
impl PriceSource for CoinGeckoSource {
    async fn fetch_usd_price(&self, id: &str) -> Result<f64> {
        let url = self.price_url();
        debug!("Fetching USD price for {id} from {url}");

        let response = self
            .client
            .get(&url)
            .query(&[("ids", id), ("vs_currencies", "usd")])
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| Error::PriceFeed(format!("request for {id} failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::PriceFeed(format!(
                "failed to fetch price for {id} ({})",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::PriceFeed(format!("failed to read price for {id}: {e}")))?;

        parse_simple_price(id, &body)
    }
}

/// Extract the USD price for `id` from a simple-price response body.
///
/// # Errors
///
/// Returns [`Error::PriceFeed`] if the body is not the expected shape or the
/// price is missing, non-finite, or not positive.
pub fn parse_simple_price(id: &str, body: &str) -> Result<f64> {
    let response: SimplePriceResponse = serde_json::from_str(body)
        .map_err(|e| Error::PriceFeed(format!("invalid price payload for {id}: {e}")))?;

    let price = response
        .get(id)
        .and_then(|entry| entry.usd)
        .ok_or_else(|| Error::PriceFeed(format!("no USD price for {id}")))?;

    if !price.is_finite() || price <= 0.0 {
        return Err(Error::PriceFeed(format!(
            "price feed returned invalid price {price} for {id}"
        )));
    }

    Ok(price)
}
