//! Platform fee pricing.
//!
//! ```text
//! FeeQuoter::resolve
//!        │
//!        ├──▶ payment_config(origin chain) ── symbol, decimals, feed id
//!        │
//!        ├──▶ PriceOracle::usd_price(feed id) ── cached / de-duplicated
//!        │           │
//!        │           └──▶ PriceSource (CoinGecko)
//!        │
//!        └──▶ TokenRegistry (external chains only)
//! ```

pub mod coingecko;
pub mod label;
pub mod oracle;
pub mod payment_config;
pub mod quote;

pub use coingecko::{CoinGeckoSource, PriceSource};
pub use label::{group_price_label, subscription_label, BillingCadence};
pub use oracle::{PriceOracle, DISPLAY_PRICE_TTL, QUOTE_PRICE_TTL};
pub use payment_config::{payment_config, PaymentConfig, TokenAccessor, PUSH_PAYMENT_CONFIG};
pub use quote::{
    FeeQuote, FeeQuoter, MoveableToken, Pricing, QuoteRequest, StaticTokenRegistry,
    TokenRegistry, Transfer, TransferMechanism, TxParams,
};
