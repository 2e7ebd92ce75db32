//! Platform fee quotes.
//!
//! A quote turns the fixed USD subscription fee into an amount of the asset
//! the user will actually pay with, plus the transaction parameters for paying
//! it to the treasury:
//!
//! - On Push Chain the fee is a native PC transfer.
//! - From an external origin chain the fee moves as funds through the
//!   wallet's moveable token for that chain's native asset.
//!
//! When the price feed or the token lookup fails the quoter does not fail the
//! caller. It returns a [`Pricing::Approximate`] quote that charges the USD
//! figure as if it were a PC quantity, and callers decide whether to warn.

use crate::address::parse_evm_address;
use crate::chain::is_push_chain_id;
use crate::clock::Clock;
use crate::config::FeeConfig;
use crate::error::{Error, Result};
use crate::pricing::oracle::PriceOracle;
use crate::pricing::payment_config::{payment_config, TokenAccessor, PUSH_PAYMENT_CONFIG};
use crate::units::{format_units, parse_units, usd_to_token_units, MAX_DISPLAY_PRECISION};
use alloy::primitives::{Address, U256};
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How a moveable token is pulled from the user's origin account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMechanism {
    /// ERC-20 approve + transferFrom.
    Approve,
    /// Uniswap Permit2 signature transfer.
    Permit2,
    /// Native asset transfer.
    Native,
}

/// A non-native asset the wallet knows how to move on the user's behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveableToken {
    /// Token symbol.
    pub symbol: String,
    /// Token decimals.
    pub decimals: u8,
    /// Token address on the origin chain (hex for EVM, base58 for Solana).
    pub address: String,
    /// Transfer mechanism.
    pub mechanism: TransferMechanism,
}

impl MoveableToken {
    /// Whether moving this token means moving the chain's native asset.
    #[must_use]
    pub fn is_native(&self) -> bool {
        self.mechanism == TransferMechanism::Native
    }
}

/// The wallet client's registry of moveable tokens.
pub trait TokenRegistry: Send + Sync {
    /// Look up the token for `accessor`, if the wallet supports it.
    fn moveable_token(&self, accessor: TokenAccessor) -> Option<MoveableToken>;
}

/// A fixed, in-memory token registry.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenRegistry {
    tokens: HashMap<TokenAccessor, MoveableToken>,
}

impl StaticTokenRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the native ETH and SOL descriptors.
    #[must_use]
    pub fn native_defaults() -> Self {
        Self::new()
            .with_token(
                TokenAccessor::Eth,
                MoveableToken {
                    symbol: "ETH".to_string(),
                    decimals: 18,
                    address: "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE".to_string(),
                    mechanism: TransferMechanism::Native,
                },
            )
            .with_token(
                TokenAccessor::Sol,
                MoveableToken {
                    symbol: "SOL".to_string(),
                    decimals: 9,
                    address: "11111111111111111111111111111111".to_string(),
                    mechanism: TransferMechanism::Native,
                },
            )
    }

    /// Add or replace a token.
    #[must_use]
    pub fn with_token(mut self, accessor: TokenAccessor, token: MoveableToken) -> Self {
        self.tokens.insert(accessor, token);
        self
    }
}

impl TokenRegistry for StaticTokenRegistry {
    fn moveable_token(&self, accessor: TokenAccessor) -> Option<MoveableToken> {
        self.tokens.get(&accessor).cloned()
    }
}

/// What the payer sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Transfer {
    /// Native value on the settlement chain.
    Native {
        /// Amount in base units.
        value: U256,
    },
    /// Funds moved from the origin chain.
    Funds {
        /// Amount in the token's base units.
        amount: U256,
        /// Token being moved.
        token: MoveableToken,
    },
}

/// Transaction parameters for paying the fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxParams {
    /// Destination (the treasury).
    pub to: Address,
    /// Value or funds.
    pub transfer: Transfer,
}

/// Whether a quote's amount came from a live price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Pricing {
    /// Converted at a price-feed price.
    Priced {
        /// Price-feed id used.
        price_feed_id: String,
        /// USD price of one whole token.
        usd_price: f64,
    },
    /// The USD figure charged as PC without conversion.
    Approximate {
        /// Why pricing failed.
        reason: String,
    },
}

/// A quote for the platform fee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeQuote {
    /// Fee in USD.
    pub usd_amount: f64,
    /// Symbol of the payment asset.
    pub symbol: String,
    /// Decimals of the payment asset.
    pub decimals: u8,
    /// Amount in base units.
    pub amount: U256,
    /// Human-readable amount, e.g. `"1980 PC"`.
    pub display_amount: String,
    /// Treasury receiving the fee.
    pub treasury_address: Address,
    /// Transaction parameters.
    pub params: TxParams,
    /// Price provenance.
    pub pricing: Pricing,
}

impl FeeQuote {
    /// Whether this is the unpriced fallback quote.
    #[must_use]
    pub fn is_approximate(&self) -> bool {
        matches!(self.pricing, Pricing::Approximate { .. })
    }

    /// Native value to send on the settlement chain, if any.
    #[must_use]
    pub fn native_value(&self) -> Option<U256> {
        match &self.params.transfer {
            Transfer::Native { value } => Some(*value),
            Transfer::Funds { .. } => None,
        }
    }
}

/// Format base units with the symbol, e.g. `"0.033 ETH"`.
#[must_use]
pub fn format_token_amount(amount: U256, decimals: u8, symbol: &str) -> String {
    let formatted = format_units(amount, decimals, decimals.min(MAX_DISPLAY_PRECISION));
    format!("{formatted} {symbol}")
}

/// Inputs to [`FeeQuoter::resolve`].
#[derive(Clone, Copy, Default)]
pub struct QuoteRequest<'a> {
    /// The connected wallet's token registry.
    pub registry: Option<&'a dyn TokenRegistry>,
    /// CAIP-2 id of the user's origin chain.
    pub origin_chain: Option<&'a str>,
    /// Treasury override; the configured treasury is used when unset.
    pub treasury_address: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct QuoteKey {
    origin_chain: String,
    treasury: Address,
    accessor: Option<TokenAccessor>,
}

#[derive(Debug, Clone)]
struct CachedQuote {
    quote: FeeQuote,
    expires_at: Instant,
}

/// Builds and caches platform fee quotes.
pub struct FeeQuoter {
    oracle: PriceOracle,
    clock: Arc<dyn Clock>,
    usd_amount: f64,
    fallback_amount: U256,
    default_treasury: Option<String>,
    ttl: Duration,
    cache_approximate: bool,
    cache: Mutex<LruCache<QuoteKey, CachedQuote>>,
}

impl FeeQuoter {
    /// Create a quoter for the fee described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configured USD amount is not a
    /// non-negative decimal.
    pub fn new(config: &FeeConfig, oracle: PriceOracle, clock: Arc<dyn Clock>) -> Result<Self> {
        let raw = config.fee.usd_amount.trim();
        let fallback_amount = parse_units(raw, PUSH_PAYMENT_CONFIG.decimals).map_err(|e| {
            Error::Config(format!("invalid subscription price {raw:?}: {e}"))
        })?;
        let usd_amount: f64 = raw
            .parse()
            .map_err(|e| Error::Config(format!("invalid subscription price {raw:?}: {e}")))?;

        let capacity =
            NonZeroUsize::new(config.quote.cache_capacity).unwrap_or(NonZeroUsize::MIN);

        info!(
            "Fee quoter initialized (usd_amount={}, ttl={}s, cache_approximate={})",
            raw, config.quote.ttl_secs, config.quote.cache_approximate
        );

        Ok(Self {
            oracle,
            clock,
            usd_amount,
            fallback_amount,
            default_treasury: config.fee.treasury_address.clone(),
            ttl: Duration::from_secs(config.quote.ttl_secs),
            cache_approximate: config.quote.cache_approximate,
            cache: Mutex::new(LruCache::new(capacity)),
        })
    }

    /// The fee in USD.
    #[must_use]
    pub fn usd_amount(&self) -> f64 {
        self.usd_amount
    }

    /// Number of cached quotes, expired ones included.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Drop every cached quote.
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    /// Resolve the platform fee quote for a payer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no treasury is configured or it is not a
    /// valid EVM address. Price and token failures never surface as errors;
    /// they produce an approximate quote instead.
    pub async fn resolve(&self, request: QuoteRequest<'_>) -> Result<FeeQuote> {
        let treasury = self.treasury(request.treasury_address)?;
        let config = payment_config(request.origin_chain);
        let key = QuoteKey {
            origin_chain: request.origin_chain.unwrap_or_default().trim().to_string(),
            treasury,
            accessor: config.token_accessor,
        };

        if let Some(quote) = self.cached(&key) {
            debug!("Quote cache hit for {:?}", key.origin_chain);
            return Ok(quote);
        }

        let quote = match self.priced_quote(treasury, request).await {
            Ok(quote) => quote,
            Err(e) => {
                warn!(
                    "Falling back to approximate fee quote for {:?}: {e}",
                    key.origin_chain
                );
                self.approximate_quote(treasury, e.to_string())
            }
        };

        if !quote.is_approximate() || self.cache_approximate {
            let expires_at = self.clock.now() + self.ttl;
            self.cache.lock().put(
                key,
                CachedQuote {
                    quote: quote.clone(),
                    expires_at,
                },
            );
        }

        Ok(quote)
    }

    fn treasury(&self, provided: Option<&str>) -> Result<Address> {
        // An explicit override replaces the default even when it is blank.
        let address = provided
            .or(self.default_treasury.as_deref())
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or_else(|| Error::Config("Treasury address is not configured.".to_string()))?;

        parse_evm_address(address)
            .map_err(|e| Error::Config(format!("invalid treasury address: {e}")))
    }

    fn cached(&self, key: &QuoteKey) -> Option<FeeQuote> {
        let now = self.clock.now();
        let mut cache = self.cache.lock();
        match cache.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.quote.clone()),
            Some(_) => {
                cache.pop(key);
                None
            }
            None => None,
        }
    }

    async fn priced_quote(&self, treasury: Address, request: QuoteRequest<'_>) -> Result<FeeQuote> {
        let config = payment_config(request.origin_chain);

        let usd_price = self
            .oracle
            .usd_price(config.price_feed_id)
            .await
            .ok_or_else(|| {
                Error::PriceFeed(format!("no USD price available for {}", config.price_feed_id))
            })?;
        let amount = usd_to_token_units(self.usd_amount, usd_price, config.decimals)?;

        let transfer = if is_push_chain_id(request.origin_chain) {
            Transfer::Native { value: amount }
        } else {
            let token = config
                .token_accessor
                .and_then(|accessor| request.registry?.moveable_token(accessor))
                .ok_or_else(|| {
                    Error::TokenResolution(
                        "Unable to resolve token information for the connected chain."
                            .to_string(),
                    )
                })?;
            Transfer::Funds { amount, token }
        };

        debug!(
            "Priced fee quote: {} USD at {} => {}",
            self.usd_amount,
            usd_price,
            format_token_amount(amount, config.decimals, config.symbol)
        );

        Ok(FeeQuote {
            usd_amount: self.usd_amount,
            symbol: config.symbol.to_string(),
            decimals: config.decimals,
            amount,
            display_amount: format_token_amount(amount, config.decimals, config.symbol),
            treasury_address: treasury,
            params: TxParams {
                to: treasury,
                transfer,
            },
            pricing: Pricing::Priced {
                price_feed_id: config.price_feed_id.to_string(),
                usd_price,
            },
        })
    }

    fn approximate_quote(&self, treasury: Address, reason: String) -> FeeQuote {
        let config = &PUSH_PAYMENT_CONFIG;
        FeeQuote {
            usd_amount: self.usd_amount,
            symbol: config.symbol.to_string(),
            decimals: config.decimals,
            amount: self.fallback_amount,
            display_amount: format_token_amount(
                self.fallback_amount,
                config.decimals,
                config.symbol,
            ),
            treasury_address: treasury,
            params: TxParams {
                to: treasury,
                transfer: Transfer::Native {
                    value: self.fallback_amount,
                },
            },
            pricing: Pricing::Approximate { reason },
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::pricing::coingecko::PriceSource;
    use crate::pricing::oracle::QUOTE_PRICE_TTL;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TREASURY: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595916Da2";
    const SEPOLIA: &str = "eip155:11155111";

    struct FixedPrices {
        prices: HashMap<&'static str, f64>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PriceSource for FixedPrices {
        async fn fetch_usd_price(&self, id: &str) -> Result<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prices
                .get(id)
                .copied()
                .ok_or_else(|| Error::PriceFeed(format!("connection refused for {id}")))
        }
    }

    fn quoter_with(
        prices: &[(&'static str, f64)],
        config: FeeConfig,
    ) -> (FeeQuoter, Arc<FixedPrices>, Arc<ManualClock>) {
        let source = Arc::new(FixedPrices {
            prices: prices.iter().copied().collect(),
            calls: AtomicUsize::new(0),
        });
        let clock = Arc::new(ManualClock::new());
        let oracle = PriceOracle::new(source.clone(), clock.clone(), QUOTE_PRICE_TTL, 16);
        let quoter = FeeQuoter::new(&config, oracle, clock.clone()).expect("valid config");
        (quoter, source, clock)
    }

    fn config_with_treasury() -> FeeConfig {
        let mut config = FeeConfig::default();
        config.fee.treasury_address = Some(TREASURY.to_string());
        config
    }

    #[tokio::test]
    async fn test_push_chain_quote_is_native_value() {
        let (quoter, _, _) = quoter_with(&[("push-protocol", 0.05)], config_with_treasury());

        let quote = quoter
            .resolve(QuoteRequest {
                origin_chain: Some("eip155:42101"),
                ..QuoteRequest::default()
            })
            .await
            .expect("quote");

        assert_eq!(quote.amount.to_string(), "1980000000000000000000");
        assert_eq!(quote.display_amount, "1980 PC");
        assert_eq!(quote.native_value(), Some(quote.amount));
        assert!(!quote.is_approximate());
        assert_eq!(quote.params.to, parse_evm_address(TREASURY).expect("address"));
    }

    #[tokio::test]
    async fn test_unset_origin_is_push_chain() {
        let (quoter, _, _) = quoter_with(&[("push-protocol", 0.05)], config_with_treasury());
        let quote = quoter.resolve(QuoteRequest::default()).await.expect("quote");
        assert_eq!(quote.symbol, "PC");
        assert!(!quote.is_approximate());
    }

    #[tokio::test]
    async fn test_external_chain_moves_funds() {
        let (quoter, _, _) = quoter_with(&[("ethereum", 3000.0)], config_with_treasury());
        let registry = StaticTokenRegistry::native_defaults();

        let quote = quoter
            .resolve(QuoteRequest {
                registry: Some(&registry),
                origin_chain: Some(SEPOLIA),
                treasury_address: None,
            })
            .await
            .expect("quote");

        assert_eq!(quote.symbol, "ETH");
        assert_eq!(quote.display_amount, "0.033 ETH");
        match &quote.params.transfer {
            Transfer::Funds { amount, token } => {
                assert_eq!(*amount, quote.amount);
                assert!(token.is_native());
            }
            Transfer::Native { .. } => panic!("expected funds transfer"),
        }
    }

    #[tokio::test]
    async fn test_price_failure_falls_back_to_approximate() {
        let (quoter, _, _) = quoter_with(&[], config_with_treasury());

        let quote = quoter.resolve(QuoteRequest::default()).await.expect("quote");

        assert!(quote.is_approximate());
        assert_eq!(quote.amount, U256::from(99u64) * crate::units::ten_pow(18));
        assert_eq!(quote.display_amount, "99 PC");
        assert_eq!(quote.native_value(), Some(quote.amount));
    }

    #[tokio::test]
    async fn test_missing_token_falls_back_to_approximate() {
        let (quoter, _, _) = quoter_with(&[("solana", 150.0)], config_with_treasury());
        let registry = StaticTokenRegistry::new();

        let quote = quoter
            .resolve(QuoteRequest {
                registry: Some(&registry),
                origin_chain: Some("solana:EtWTRABZaYq6iMfeYKouRu166VU2xqa1"),
                treasury_address: None,
            })
            .await
            .expect("quote");

        assert!(quote.is_approximate());
        assert_eq!(quote.symbol, "PC");
        match quote.pricing {
            Pricing::Approximate { reason } => assert!(reason.contains("token information")),
            Pricing::Priced { .. } => panic!("expected approximate pricing"),
        }
    }

    #[tokio::test]
    async fn test_missing_treasury_is_a_config_error() {
        let (quoter, _, _) = quoter_with(&[("push-protocol", 0.05)], FeeConfig::default());

        let result = quoter.resolve(QuoteRequest::default()).await;
        assert!(matches!(result, Err(Error::Config(_))));

        let result = quoter
            .resolve(QuoteRequest {
                treasury_address: Some("  "),
                ..QuoteRequest::default()
            })
            .await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_request_treasury_overrides_default() {
        let (quoter, _, _) = quoter_with(&[("push-protocol", 0.05)], config_with_treasury());
        let other = "0x0000000000000000000000000000000000000001";

        let quote = quoter
            .resolve(QuoteRequest {
                treasury_address: Some(other),
                ..QuoteRequest::default()
            })
            .await
            .expect("quote");
        assert_eq!(quote.treasury_address, parse_evm_address(other).expect("address"));
    }

    #[tokio::test]
    async fn test_blank_treasury_override_is_rejected() {
        let (quoter, _, _) = quoter_with(&[("push-protocol", 0.05)], config_with_treasury());

        let result = quoter
            .resolve(QuoteRequest {
                treasury_address: Some(""),
                ..QuoteRequest::default()
            })
            .await;
        assert!(matches!(result, Err(Error::Config(_))));
        assert_eq!(quoter.cached_len(), 0);
    }

    #[tokio::test]
    async fn test_quotes_are_cached_per_key() {
        let (quoter, source, clock) =
            quoter_with(&[("push-protocol", 0.05), ("ethereum", 3000.0)], config_with_treasury());
        let registry = StaticTokenRegistry::native_defaults();

        quoter.resolve(QuoteRequest::default()).await.expect("quote");
        // Price cache expires before the quote cache does.
        clock.advance(Duration::from_secs(120));
        quoter.resolve(QuoteRequest::default()).await.expect("quote");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        quoter
            .resolve(QuoteRequest {
                registry: Some(&registry),
                origin_chain: Some(SEPOLIA),
                treasury_address: None,
            })
            .await
            .expect("quote");
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(quoter.cached_len(), 2);

        clock.advance(Duration::from_secs(300));
        quoter.resolve(QuoteRequest::default()).await.expect("quote");
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_clear_cache_forces_repricing() {
        let (quoter, source, _) = quoter_with(&[("push-protocol", 0.05)], config_with_treasury());
        assert!((quoter.usd_amount() - 99.0).abs() < f64::EPSILON);

        quoter.resolve(QuoteRequest::default()).await.expect("quote");
        assert_eq!(quoter.cached_len(), 1);

        quoter.clear_cache();
        assert_eq!(quoter.cached_len(), 0);
        let quote = quoter.resolve(QuoteRequest::default()).await.expect("quote");
        assert_eq!(quote.display_amount, "1980 PC");
        // The price is still cached by the oracle.
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_approximate_quotes_not_cached_when_disabled() {
        let mut config = config_with_treasury();
        config.quote.cache_approximate = false;
        let (quoter, _, _) = quoter_with(&[], config);

        let quote = quoter.resolve(QuoteRequest::default()).await.expect("quote");
        assert!(quote.is_approximate());
        assert_eq!(quoter.cached_len(), 0);
    }

    #[test]
    fn test_invalid_usd_amount_rejected() {
        let source = Arc::new(FixedPrices {
            prices: HashMap::new(),
            calls: AtomicUsize::new(0),
        });
        let clock = Arc::new(ManualClock::new());
        let oracle = PriceOracle::new(source, clock.clone(), QUOTE_PRICE_TTL, 16);
        let mut config = FeeConfig::default();
        config.fee.usd_amount = "ninety-nine".to_string();

        assert!(FeeQuoter::new(&config, oracle, clock).is_err());
    }
}
