//! Process-wide wiring of the fee components.
//!
//! The price caches, quote cache and RPC clients are built once at startup
//! and shared by reference; nothing in this crate is a module-level
//! singleton.

use crate::clock::{Clock, SystemClock};
use crate::config::FeeConfig;
use crate::error::Result;
use crate::preflight::BalanceValidator;
use crate::pricing::coingecko::{CoinGeckoSource, PriceSource};
use crate::pricing::oracle::PriceOracle;
use crate::pricing::quote::FeeQuoter;
use crate::rpc::{AlloyEvmRpc, EvmRpc, HttpOriginRpcs, OriginRpcs};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// The fee quoter, a display-price oracle and the balance validator, sharing
/// one price source.
pub struct FeeEngine {
    quoter: FeeQuoter,
    display_oracle: PriceOracle,
    validator: BalanceValidator,
}

impl FeeEngine {
    /// Build an engine talking to the configured price feed and RPC
    /// endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if the fee amount or the Push Chain RPC endpoints are
    /// invalid.
    pub fn from_config(config: &FeeConfig) -> Result<Self> {
        let source: Arc<dyn PriceSource> = Arc::new(CoinGeckoSource::new(&config.price_feed));
        let settlement: Arc<dyn EvmRpc> = Arc::new(AlloyEvmRpc::new(&config.push_chain.rpc_urls)?);
        let origins: Arc<dyn OriginRpcs> = Arc::new(HttpOriginRpcs::new(config));
        Self::with_parts(config, source, settlement, origins, Arc::new(SystemClock))
    }

    /// Build an engine from explicit collaborators.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured fee amount is invalid.
    pub fn with_parts(
        config: &FeeConfig,
        source: Arc<dyn PriceSource>,
        settlement: Arc<dyn EvmRpc>,
        origins: Arc<dyn OriginRpcs>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let feed = &config.price_feed;
        let quote_oracle = PriceOracle::new(
            Arc::clone(&source),
            Arc::clone(&clock),
            Duration::from_secs(feed.quote_price_ttl_secs),
            feed.cache_capacity,
        );
        let display_oracle = PriceOracle::new(
            source,
            Arc::clone(&clock),
            Duration::from_secs(feed.display_price_ttl_secs),
            feed.cache_capacity,
        );

        let quoter = FeeQuoter::new(config, quote_oracle, clock)?;
        let validator = BalanceValidator::new(
            settlement,
            config.push_chain.chain,
            origins,
            config.preflight.clone(),
        );

        info!(
            "Fee engine ready (settlement={}, price_feed={})",
            config.push_chain.chain, feed.base_url
        );

        Ok(Self {
            quoter,
            display_oracle,
            validator,
        })
    }

    /// The fee quoter.
    #[must_use]
    pub fn quoter(&self) -> &FeeQuoter {
        &self.quoter
    }

    /// Oracle with the longer display TTL, for price labels.
    #[must_use]
    pub fn display_oracle(&self) -> &PriceOracle {
        &self.display_oracle
    }

    /// The balance validator.
    #[must_use]
    pub fn validator(&self) -> &BalanceValidator {
        &self.validator
    }
}
