//! Configuration for pushcampus-fees.

use crate::chain::Chain;
use crate::pricing::oracle::{DEFAULT_PRICE_CACHE_CAPACITY, DISPLAY_PRICE_TTL, QUOTE_PRICE_TTL};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Behaviour of the balance preflight when an RPC check cannot complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailMode {
    /// Treat inconclusive checks as sufficient.
    #[default]
    Open,
    /// Treat inconclusive checks as insufficient.
    Closed,
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// The fee being charged.
    #[serde(default)]
    pub fee: FeeSettings,

    /// Price feed settings.
    #[serde(default)]
    pub price_feed: PriceFeedConfig,

    /// Quote cache settings.
    #[serde(default)]
    pub quote: QuoteConfig,

    /// Settlement chain settings.
    #[serde(default)]
    pub push_chain: PushChainConfig,

    /// Balance preflight settings.
    #[serde(default)]
    pub preflight: PreflightConfig,

    /// RPC endpoints per origin chain, keyed by CAIP-2 id.
    /// Chains without an entry use their default public endpoint.
    #[serde(default)]
    pub origin_rpc_overrides: HashMap<String, String>,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            fee: FeeSettings::default(),
            price_feed: PriceFeedConfig::default(),
            quote: QuoteConfig::default(),
            push_chain: PushChainConfig::default(),
            preflight: PreflightConfig::default(),
            origin_rpc_overrides: HashMap::new(),
        }
    }
}

/// The platform fee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeSettings {
    /// Subscription price in USD, as a decimal string.
    #[serde(default = "default_usd_amount")]
    pub usd_amount: String,

    /// Treasury that receives the fee (e.g. "0x...").
    /// Quotes cannot be built without one.
    #[serde(default)]
    pub treasury_address: Option<String>,
}

impl Default for FeeSettings {
    fn default() -> Self {
        Self {
            usd_amount: default_usd_amount(),
            treasury_address: None,
        }
    }
}

/// Price feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceFeedConfig {
    /// Base URL of the simple-price API.
    #[serde(default = "default_price_feed_url")]
    pub base_url: String,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Cache lifetime of prices used for quoting, in seconds.
    #[serde(default = "default_quote_price_ttl")]
    pub quote_price_ttl_secs: u64,

    /// Cache lifetime of prices used for display labels, in seconds.
    #[serde(default = "default_display_price_ttl")]
    pub display_price_ttl_secs: u64,

    /// Maximum number of price-feed ids cached.
    #[serde(default = "default_price_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for PriceFeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_price_feed_url(),
            request_timeout_secs: default_request_timeout(),
            quote_price_ttl_secs: default_quote_price_ttl(),
            display_price_ttl_secs: default_display_price_ttl(),
            cache_capacity: default_price_cache_capacity(),
        }
    }
}

/// Quote cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteConfig {
    /// Lifetime of a cached quote in seconds.
    #[serde(default = "default_quote_ttl")]
    pub ttl_secs: u64,

    /// Cache approximate (fallback) quotes as well as priced ones.
    /// When true, a price feed outage pins callers to the approximate quote
    /// until the entry expires.
    #[serde(default = "default_cache_approximate")]
    pub cache_approximate: bool,

    /// Maximum number of cached quotes.
    #[serde(default = "default_quote_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_quote_ttl(),
            cache_approximate: default_cache_approximate(),
            cache_capacity: default_quote_cache_capacity(),
        }
    }
}

/// Settlement chain configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushChainConfig {
    /// Which Push Chain network settles the fee.
    #[serde(default = "default_push_chain")]
    pub chain: Chain,

    /// RPC endpoints, tried in order.
    #[serde(default = "default_push_rpc_urls")]
    pub rpc_urls: Vec<String>,
}

impl Default for PushChainConfig {
    fn default() -> Self {
        Self {
            chain: default_push_chain(),
            rpc_urls: default_push_rpc_urls(),
        }
    }
}

/// Balance preflight configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreflightConfig {
    /// What to do when a check cannot complete.
    #[serde(default)]
    pub fail_mode: FailMode,

    /// Gas units assumed on the settlement chain when estimation fails.
    #[serde(default = "default_fallback_gas_units")]
    pub fallback_gas_units: u64,

    /// Gas units reserved on EVM origin chains for the funds transfer.
    #[serde(default = "default_origin_gas_buffer_units")]
    pub origin_gas_buffer_units: u64,

    /// Lamports reserved on Solana for fees and rent.
    #[serde(default = "default_solana_fee_buffer")]
    pub solana_fee_buffer_lamports: u64,
}

impl Default for PreflightConfig {
    fn default() -> Self {
        Self {
            fail_mode: FailMode::default(),
            fallback_gas_units: default_fallback_gas_units(),
            origin_gas_buffer_units: default_origin_gas_buffer_units(),
            solana_fee_buffer_lamports: default_solana_fee_buffer(),
        }
    }
}

impl FeeConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn to_file(&self, path: &std::path::Path) -> crate::Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// RPC endpoint for an origin chain: the configured override if any,
    /// otherwise the chain's default.
    #[must_use]
    pub fn origin_rpc_url(&self, chain: Chain) -> String {
        self.origin_rpc_overrides
            .get(chain.caip2())
            .cloned()
            .unwrap_or_else(|| chain.metadata().default_rpc.to_string())
    }

    /// Default location of the configuration file.
    #[must_use]
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("", "", "pushcampus").map_or_else(
            || PathBuf::from(".pushcampus/fees.toml"),
            |dirs| dirs.config_dir().join("fees.toml"),
        )
    }
}

/// Split a comma-separated list of RPC URLs, falling back to the Push Chain
/// defaults when the list is unset or empty.
#[must_use]
pub fn parse_rpc_urls(value: Option<&str>) -> Vec<String> {
    let urls: Vec<String> = value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(ToString::to_string)
        .collect();

    if urls.is_empty() {
        default_push_rpc_urls()
    } else {
        urls
    }
}

/// Parse a positive integer, returning `fallback` for unset, non-numeric or
/// non-positive input. Fractional values are floored.
#[must_use]
pub fn parse_positive_int(value: Option<&str>, fallback: u64) -> u64 {
    let Some(parsed) = value.and_then(|v| v.trim().parse::<f64>().ok()) else {
        return fallback;
    };
    if !parsed.is_finite() || parsed < 1.0 || parsed > u64::MAX as f64 {
        return fallback;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let floored = parsed.floor() as u64;
    floored
}

fn default_usd_amount() -> String {
    "99".to_string()
}

fn default_price_feed_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

const fn default_request_timeout() -> u64 {
    15
}

const fn default_quote_price_ttl() -> u64 {
    QUOTE_PRICE_TTL.as_secs()
}

const fn default_display_price_ttl() -> u64 {
    DISPLAY_PRICE_TTL.as_secs()
}

const fn default_price_cache_capacity() -> usize {
    DEFAULT_PRICE_CACHE_CAPACITY
}

const fn default_quote_ttl() -> u64 {
    5 * 60
}

const fn default_cache_approximate() -> bool {
    true
}

const fn default_quote_cache_capacity() -> usize {
    1024
}

const fn default_push_chain() -> Chain {
    Chain::PushTestnetDonut
}

fn default_push_rpc_urls() -> Vec<String> {
    vec![
        "https://evm.rpc-testnet-donut-node1.push.org".to_string(),
        "https://evm.rpc-testnet-donut-node2.push.org".to_string(),
    ]
}

const fn default_fallback_gas_units() -> u64 {
    100_000
}

const fn default_origin_gas_buffer_units() -> u64 {
    100_000
}

const fn default_solana_fee_buffer() -> u64 {
    // Five signatures at 5000 lamports plus headroom for rent.
    1_000_000
}

fn default_log_level() -> String {
    "info".to_string()
}
